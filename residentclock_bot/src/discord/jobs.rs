use std::num::NonZeroU64;

use anyhow::{anyhow, Result};
use poise::async_trait;
use poise::serenity_prelude as serenity;
use tracing::{event, field, instrument, Level, Span};

use crate::job::{Job, JobArgs, JobReport, JobResult};
use crate::timezone::clock_channel_name;

/// Renames a channel. Implemented by serenity's http client.
#[async_trait]
pub trait ChannelRenamer: Send + Sync {
    async fn rename_channel(&self, channel_id: u64, name: &str) -> Result<()>;
}

#[async_trait]
impl ChannelRenamer for serenity::Http {
    async fn rename_channel(&self, channel_id: u64, name: &str) -> Result<()> {
        let channel = NonZeroU64::new(channel_id)
            .map(serenity::ChannelId::from)
            .ok_or_else(|| anyhow!("Channel id 0 is not a valid channel"))?;

        channel
            .edit(self, serenity::EditChannel::new().name(name))
            .await?;

        Ok(())
    }
}

/// Renames the clock channel of every server to its local time.
struct ClocktowerJob;

#[async_trait]
impl Job for ClocktowerJob {
    fn name(&self) -> &'static str {
        "clocktower"
    }

    #[instrument(level = "debug", name = "residentclock.jobs.clocktower", skip_all, fields(server_id = field::Empty))]
    async fn run(&self, args: &JobArgs) -> JobResult {
        let configs = args.store.load_all().await?;
        let mut report = JobReport::default();

        event!(Level::DEBUG, "Updating clock channels of {} servers at {}", configs.len(), &args.fired_at);

        for config in configs {
            let Some(channel_id) = config.clock_channel else {
                continue;
            };
            Span::current().record("server_id", config.server_id);

            let name = match clock_channel_name(args.fired_at, config.timezone_offset) {
                Ok(name) => name,
                Err(error) => {
                    event!(Level::WARN, %error, "Skipping clock channel {}", channel_id);
                    report.failed += 1;
                    continue;
                }
            };

            match args.renamer.rename_channel(channel_id, &name).await {
                Ok(()) => {
                    event!(Level::TRACE, %name, "Renamed clock channel {}", channel_id);
                    report.succeeded += 1;
                }
                Err(error) => {
                    event!(Level::ERROR, ?error, "Error renaming clock channel {}", channel_id);
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }
}

pub fn clocktower() -> Box<dyn Job> {
    Box::new(ClocktowerJob)
}
