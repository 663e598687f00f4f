//! Forward ledger inspection.

use clap::{Args, ValueEnum};
use mirrorbot_core::types::BotKey;
use mirrorbot_core::Config;
use mirrorbot_ledger::{ForwardRecord, RecordLookup, RecordStore, Side, SqliteRecordStore};
use std::path::Path;

/// Records command arguments.
#[derive(Args)]
pub struct RecordsArgs {
    #[command(subcommand)]
    pub command: RecordsCommand,
}

#[derive(clap::Subcommand)]
pub enum RecordsCommand {
    /// Show the most recent records
    Recent {
        /// Number of records to show
        #[arg(short, long, default_value_t = 20)]
        limit: usize,

        /// Print records as JSON lines
        #[arg(long)]
        json: bool,
    },

    /// Find the records of one message
    Lookup {
        /// Side the message id belongs to
        #[arg(value_enum)]
        side: LookupSide,

        /// Message id
        message_id: String,

        /// Bot identity as `platform:self_id`
        #[arg(long)]
        bot: String,

        /// Channel id
        #[arg(long)]
        channel: String,
    },
}

/// Ledger side selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LookupSide {
    /// The message as received
    Origin,
    /// The forwarded copy
    Destination,
}

impl From<LookupSide> for Side {
    fn from(side: LookupSide) -> Self {
        match side {
            LookupSide::Origin => Side::Origin,
            LookupSide::Destination => Side::Destination,
        }
    }
}

/// Run the records command.
pub async fn run(args: RecordsArgs, config_path: &Path) -> anyhow::Result<()> {
    let config = Config::load(config_path)?;
    let store = SqliteRecordStore::open(&config.ledger_path()?).await?;

    match args.command {
        RecordsCommand::Recent { limit, json } => {
            for record in store.recent(limit).await? {
                if json {
                    println!("{}", serde_json::to_string(&record)?);
                } else {
                    println!("{}", format_record(&record));
                }
            }
        }

        RecordsCommand::Lookup {
            side,
            message_id,
            bot,
            channel,
        } => {
            let lookup = RecordLookup {
                side: side.into(),
                message_id,
                bot: BotKey::from_raw(bot),
                channel_id: channel,
            };
            let records = store.find(&lookup).await?;
            if records.is_empty() {
                println!("No records");
            }
            for record in &records {
                println!("{}", format_record(record));
            }
        }
    }

    Ok(())
}

/// One-line summary of a record.
pub fn format_record(record: &ForwardRecord) -> String {
    format!(
        "#{} {} {}#{} {} -> {}#{} {}",
        record.id,
        record.created_at.format("%Y-%m-%d %H:%M:%S"),
        record.origin_bot,
        record.origin_channel_id,
        record.origin_message_id,
        record.dest_bot,
        record.dest_channel_id,
        record.dest_message_id
    )
}
