//! Giveaways: timed draws entered by reacting with 🎉.
//!
//! Resolution can be triggered by the minute tick or by `/giveaway_end`. Both go through
//! [`GiveawayRepository::claim_resolution`], and only the caller that flips the giveaway from
//! active to resolving draws and announces winners. The giveaway is ended only once the
//! announcement is posted; if posting fails, a later tick takes the claim over and announces
//! the winners already stored.

use chrono::{DateTime, Duration, Utc};
use rand::{seq::IndexedRandom, Rng};
use sea_orm::DatabaseConnection;

use crate::{
    model::giveaway::PaginatedGiveawaysDto,
    server::{
        bot::{
            event::ReactionEvent,
            platform::{color, EmbedSpec, OutgoingMessage, Platform},
        },
        data::{giveaway::GiveawayRepository, total_pages},
        error::AppError,
        model::giveaway::{CreateGiveawayParams, Giveaway, GiveawayStatus, ENTRY_EMOJI},
    },
};

pub const MAX_DURATION_MINUTES: u32 = 40_320;
pub const MAX_WINNERS: u32 = 20;

/// How long a resolution claim is held before a tick may retry it.
pub const RESOLUTION_LEASE_MINUTES: i64 = 2;

/// Giveaway as requested by `/giveaway_start`, before its message exists.
#[derive(Debug, Clone, PartialEq)]
pub struct StartGiveawayParams {
    pub guild_id: u64,
    pub channel_id: u64,
    pub prize: String,
    pub description: Option<String>,
    pub minutes: u32,
    pub winner_count: u32,
    pub created_by: u64,
}

/// Draws `count` distinct winners uniformly at random.
///
/// When there are no more entrants than winners, every entrant wins.
pub fn pick_winners<R: Rng + ?Sized>(entrants: &[u64], count: usize, rng: &mut R) -> Vec<u64> {
    if entrants.len() <= count {
        return entrants.to_vec();
    }
    entrants.choose_multiple(rng, count).copied().collect()
}

fn lease_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::minutes(RESOLUTION_LEASE_MINUTES)
}

pub struct GiveawayService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> GiveawayService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Posts the entry message, adds the 🎉 reaction and stores the giveaway.
    ///
    /// # Arguments
    /// - `platform` - Discord access
    /// - `params` - Prize, duration and winner count
    /// - `now` - Start time; the giveaway ends `minutes` after it
    ///
    /// # Returns
    /// - `Ok(Giveaway)` - The stored giveaway
    /// - `Err(AppError::InvalidArgument)` - Duration or winner count out of range
    ///
    /// The entry message is deleted again if the giveaway cannot be stored.
    pub async fn start(
        &self,
        platform: &dyn Platform,
        params: StartGiveawayParams,
        now: DateTime<Utc>,
    ) -> Result<Giveaway, AppError> {
        if params.minutes > MAX_DURATION_MINUTES {
            return Err(AppError::InvalidArgument(format!(
                "Duration must be at most {} minutes.",
                MAX_DURATION_MINUTES
            )));
        }
        if params.winner_count == 0 || params.winner_count > MAX_WINNERS {
            return Err(AppError::InvalidArgument(format!(
                "Winner count must be between 1 and {}.",
                MAX_WINNERS
            )));
        }
        let prize = params.prize.trim().to_string();
        if prize.is_empty() {
            return Err(AppError::InvalidArgument("The prize cannot be empty.".to_string()));
        }

        let ends_at = now + Duration::minutes(params.minutes as i64);
        let mut embed = EmbedSpec::new()
            .title(format!("🎉 {}", prize))
            .color(color::GIVEAWAY)
            .field("Winners", params.winner_count.to_string(), true)
            .field("Ends", format!("<t:{}:R>", ends_at.timestamp()), true)
            .field("Hosted by", format!("<@{}>", params.created_by), true)
            .footer(format!("React with {} to enter", ENTRY_EMOJI))
            .timestamp(ends_at);
        if let Some(description) = &params.description {
            embed = embed.description(description.clone());
        }

        let message_id = platform
            .send_message(params.channel_id, OutgoingMessage::embed(embed))
            .await?;

        if let Err(e) = platform
            .add_reaction(params.channel_id, message_id, ENTRY_EMOJI)
            .await
        {
            tracing::warn!("Failed to add entry reaction to giveaway {}: {}", message_id, e);
        }

        let created = GiveawayRepository::new(self.db)
            .create(CreateGiveawayParams {
                guild_id: params.guild_id,
                channel_id: params.channel_id,
                message_id,
                prize,
                description: params.description,
                winner_count: params.winner_count,
                ends_at,
                created_by: params.created_by,
            })
            .await;
        let giveaway = match created {
            Ok(giveaway) => giveaway,
            Err(e) => {
                if let Err(delete_err) = platform
                    .delete_message(params.channel_id, message_id)
                    .await
                {
                    tracing::error!(
                        "Failed to delete orphaned giveaway message {} in channel {}: {}",
                        message_id,
                        params.channel_id,
                        delete_err
                    );
                }
                return Err(e.into());
            }
        };

        tracing::info!(
            "Started giveaway {} in guild {}, ending at {}",
            giveaway.id,
            giveaway.guild_id,
            giveaway.ends_at
        );

        Ok(giveaway)
    }

    /// Adds or withdraws an entrant for a 🎉 reaction on an active giveaway message.
    ///
    /// Returns whether the entrant set changed.
    pub async fn on_reaction(&self, event: &ReactionEvent, added: bool) -> Result<bool, AppError> {
        if event.emoji != ENTRY_EMOJI {
            return Ok(false);
        }

        let repo = GiveawayRepository::new(self.db);
        let Some(giveaway) = repo.find_by_message(event.message_id).await? else {
            return Ok(false);
        };
        if giveaway.status != GiveawayStatus::Active || giveaway.guild_id != event.guild_id {
            return Ok(false);
        }

        let changed = if added {
            repo.add_entry(giveaway.id, event.user_id).await?
        } else {
            repo.remove_entry(giveaway.id, event.user_id).await?
        };

        Ok(changed)
    }

    /// Ends a giveaway ahead of time.
    ///
    /// # Returns
    /// - `Ok(Vec<u64>)` - Winners drawn
    /// - `Err(AppError::NotFound)` - No giveaway on that message in this guild
    /// - `Err(AppError::Conflict)` - Already ended or being resolved
    pub async fn end(
        &self,
        platform: &dyn Platform,
        guild_id: u64,
        message_id: u64,
        now: DateTime<Utc>,
    ) -> Result<Vec<u64>, AppError> {
        let giveaway = GiveawayRepository::new(self.db)
            .find_by_message(message_id)
            .await?
            .filter(|g| g.guild_id == guild_id)
            .ok_or_else(|| {
                AppError::NotFound("No giveaway exists for that message.".to_string())
            })?;
        if giveaway.status != GiveawayStatus::Active {
            return Err(AppError::Conflict("That giveaway has already ended.".to_string()));
        }

        self.resolve(platform, giveaway, now)
            .await?
            .ok_or_else(|| AppError::Conflict("That giveaway has already ended.".to_string()))
    }

    /// Resolves every giveaway due at `now` and retries resolutions whose claim has lapsed.
    /// Failures are logged per giveaway.
    ///
    /// Returns how many giveaways this call resolved.
    pub async fn resolve_due(
        &self,
        platform: &dyn Platform,
        now: DateTime<Utc>,
    ) -> Result<usize, AppError> {
        let repo = GiveawayRepository::new(self.db);
        let stalled = repo.find_stalled(lease_cutoff(now)).await?;
        for giveaway in &stalled {
            tracing::warn!(
                "Retrying resolution of giveaway {} (attempt {})",
                giveaway.id,
                giveaway.resolution_attempts + 1
            );
        }
        let due = repo.find_due(now).await?;

        let mut resolved = 0;
        for giveaway in stalled.into_iter().chain(due) {
            let id = giveaway.id;
            match self.resolve(platform, giveaway, now).await {
                Ok(Some(_)) => resolved += 1,
                Ok(None) => tracing::debug!("Giveaway {} was resolved elsewhere", id),
                Err(e) => tracing::error!("Failed to resolve giveaway {}: {}", id, e),
            }
        }

        Ok(resolved)
    }

    /// Claims the resolution, draws and announces winners, then marks the giveaway ended.
    ///
    /// A resolving giveaway whose claim has lapsed is taken over and announced with the winners
    /// stored by the earlier attempt. If the announcement fails the giveaway stays resolving.
    ///
    /// Returns `None` when another caller holds or finished the resolution.
    pub async fn resolve(
        &self,
        platform: &dyn Platform,
        giveaway: Giveaway,
        now: DateTime<Utc>,
    ) -> Result<Option<Vec<u64>>, AppError> {
        let repo = GiveawayRepository::new(self.db);
        let claimed = match giveaway.status {
            GiveawayStatus::Active => repo.claim_resolution(&giveaway, now).await?,
            GiveawayStatus::Resolving => {
                repo.reclaim_resolution(&giveaway, lease_cutoff(now), now)
                    .await?
            }
            GiveawayStatus::Ended => false,
        };
        if !claimed {
            return Ok(None);
        }
        let attempt = giveaway.resolution_attempts + 1;

        let entrants = repo.entrants(giveaway.id).await?;
        let winners = match giveaway.winners {
            Some(winners) => winners,
            None => {
                // The thread-local rng is not Send; keep it out of any await.
                let winners =
                    pick_winners(&entrants, giveaway.winner_count as usize, &mut rand::rng());
                repo.record_winners(giveaway.id, &winners).await?;
                winners
            }
        };

        let mentions = winners
            .iter()
            .map(|id| format!("<@{}>", id))
            .collect::<Vec<_>>()
            .join(", ");

        let result = EmbedSpec::new()
            .title(format!("🎉 {} (ended)", giveaway.prize))
            .description(if winners.is_empty() {
                "No valid entries.".to_string()
            } else {
                format!("Winners: {}", mentions)
            })
            .color(color::GIVEAWAY)
            .field("Entries", entrants.len().to_string(), true)
            .footer("Ended")
            .timestamp(now);
        if let Err(e) = platform
            .edit_message(
                giveaway.channel_id,
                giveaway.message_id,
                OutgoingMessage::embed(result),
            )
            .await
        {
            tracing::warn!("Failed to update giveaway message {}: {}", giveaway.message_id, e);
        }

        let announcement = if winners.is_empty() {
            format!("The giveaway for **{}** ended with no winners.", giveaway.prize)
        } else {
            format!("Congratulations {}! You won **{}**!", mentions, giveaway.prize)
        };
        platform
            .send_message(giveaway.channel_id, OutgoingMessage::text(announcement))
            .await?;

        if !repo.finish_resolution(giveaway.id, attempt, now).await? {
            tracing::warn!(
                "Giveaway {} was reclaimed before attempt {} finished",
                giveaway.id,
                attempt
            );
        }

        tracing::info!(
            "Resolved giveaway {} with {} winner(s) from {} entrant(s)",
            giveaway.id,
            winners.len(),
            entrants.len()
        );

        Ok(Some(winners))
    }

    pub async fn get_paginated(
        &self,
        guild_id: u64,
        page: u64,
        per_page: u64,
    ) -> Result<PaginatedGiveawaysDto, AppError> {
        let (giveaways, total) = GiveawayRepository::new(self.db)
            .get_paginated(guild_id, page, per_page)
            .await?;

        Ok(PaginatedGiveawaysDto {
            giveaways: giveaways.into_iter().map(Giveaway::into_dto).collect(),
            total,
            page,
            per_page,
            total_pages: total_pages(total, per_page),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::bot::fake::{Call, FakePlatform};
    use rand::{rngs::StdRng, SeedableRng};
    use test_utils::{
        builder::TestBuilder,
        factory::giveaway::{add_entry, GiveawayFactory},
    };

    fn entry(message_id: u64, user_id: u64) -> ReactionEvent {
        ReactionEvent {
            guild_id: 10,
            channel_id: 20,
            message_id,
            user_id,
            emoji: ENTRY_EMOJI.to_string(),
        }
    }

    #[test]
    fn picks_distinct_winners() {
        let mut rng = StdRng::seed_from_u64(7);
        let entrants = [1, 2, 3];

        for _ in 0..50 {
            let mut winners = pick_winners(&entrants, 2, &mut rng);
            assert!(winners.iter().all(|w| entrants.contains(w)));
            winners.sort();
            winners.dedup();
            assert_eq!(winners.len(), 2);
        }
    }

    #[test]
    fn everyone_wins_when_short_of_entrants() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(pick_winners(&[5, 6], 3, &mut rng), vec![5, 6]);
        assert!(pick_winners(&[], 1, &mut rng).is_empty());
    }

    /// Tests a zero-minute, two-winner giveaway with three entrants.
    ///
    /// Expected: due immediately, two distinct winners among the entrants
    #[tokio::test]
    async fn zero_minute_giveaway_draws_two_of_three() -> Result<(), AppError> {
        let test = TestBuilder::new().with_giveaway_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let platform = FakePlatform::new();
        let service = GiveawayService::new(db);
        let now = Utc::now();

        let giveaway = service
            .start(
                &platform,
                StartGiveawayParams {
                    guild_id: 10,
                    channel_id: 20,
                    prize: "Ferris plushie".to_string(),
                    description: None,
                    minutes: 0,
                    winner_count: 2,
                    created_by: 1,
                },
                now,
            )
            .await?;
        for user in [101, 102, 103] {
            assert!(service.on_reaction(&entry(giveaway.message_id, user), true).await?);
        }

        assert_eq!(service.resolve_due(&platform, now).await?, 1);

        let stored = GiveawayRepository::new(db)
            .find_by_id(giveaway.id)
            .await?
            .unwrap();
        assert_eq!(stored.status, GiveawayStatus::Ended);
        let winners = stored.winners.unwrap();
        assert_eq!(winners.len(), 2);
        assert_ne!(winners[0], winners[1]);
        assert!(winners.iter().all(|w| [101, 102, 103].contains(w)));

        Ok(())
    }

    /// Tests that a giveaway resolved by the tick and then ended manually announces once.
    ///
    /// Expected: one announcement, manual end Err(Conflict)
    #[tokio::test]
    async fn resolves_only_once() -> Result<(), AppError> {
        let test = TestBuilder::new().with_giveaway_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let platform = FakePlatform::new();
        let service = GiveawayService::new(db);
        let now = Utc::now();

        let giveaway = GiveawayFactory::new(db, "10")
            .channel_id("20")
            .message_id("30")
            .ends_at(now - Duration::minutes(1))
            .build()
            .await?;
        add_entry(db, giveaway.id, "101").await?;

        service.resolve_due(&platform, now).await?;
        let manual = service.end(&platform, 10, 30, now).await;

        assert!(matches!(manual, Err(AppError::Conflict(_))));
        assert_eq!(platform.messages_to(20).len(), 1);
        assert_eq!(
            platform.count(|c| matches!(c, Call::EditMessage { message_id: 30, .. })),
            1
        );

        Ok(())
    }

    /// Tests that a failed announcement is retried by a later tick with the same winners.
    ///
    /// Expected: first tick leaves the giveaway resolving, a tick within the lease does
    /// nothing, the tick after it announces once and ends the giveaway
    #[tokio::test]
    async fn failed_announcement_is_retried() -> Result<(), AppError> {
        let test = TestBuilder::new().with_giveaway_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let platform = FakePlatform::new().with_failing_send(20);
        let service = GiveawayService::new(db);
        let repo = GiveawayRepository::new(db);
        let now = Utc::now();

        let giveaway = GiveawayFactory::new(db, "10")
            .channel_id("20")
            .message_id("30")
            .winner_count(1)
            .ends_at(now - Duration::minutes(1))
            .build()
            .await?;
        add_entry(db, giveaway.id, "101").await?;
        add_entry(db, giveaway.id, "102").await?;

        assert_eq!(service.resolve_due(&platform, now).await?, 0);
        let pending = repo.find_by_id(giveaway.id).await?.unwrap();
        assert_eq!(pending.status, GiveawayStatus::Resolving);
        let drawn = pending.winners.unwrap();
        assert_eq!(drawn.len(), 1);
        assert!(platform.messages_to(20).is_empty());

        assert!(matches!(
            service.end(&platform, 10, 30, now).await,
            Err(AppError::Conflict(_))
        ));
        assert_eq!(
            service
                .resolve_due(&platform, now + Duration::minutes(1))
                .await?,
            0
        );

        let later = now + Duration::minutes(RESOLUTION_LEASE_MINUTES + 1);
        assert_eq!(service.resolve_due(&platform, later).await?, 1);
        assert_eq!(service.resolve_due(&platform, later).await?, 0);

        let stored = repo.find_by_id(giveaway.id).await?.unwrap();
        assert_eq!(stored.status, GiveawayStatus::Ended);
        assert_eq!(stored.winners.unwrap(), drawn);
        let announcements = platform.messages_to(20);
        assert_eq!(announcements.len(), 1);
        assert!(announcements[0]
            .content
            .as_deref()
            .unwrap()
            .contains(&format!("<@{}>", drawn[0])));

        Ok(())
    }

    /// Tests that a retried resolution announces the stored winners instead of drawing again.
    ///
    /// Expected: the stored winner is announced although they are not an entrant
    #[tokio::test]
    async fn retry_announces_stored_winners() -> Result<(), AppError> {
        let test = TestBuilder::new().with_giveaway_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let platform = FakePlatform::new();
        let service = GiveawayService::new(db);
        let now = Utc::now();

        let giveaway = GiveawayFactory::new(db, "10")
            .channel_id("20")
            .ends_at(now - Duration::minutes(30))
            .resolving(now - Duration::minutes(10), &[202])
            .build()
            .await?;
        add_entry(db, giveaway.id, "101").await?;

        assert_eq!(service.resolve_due(&platform, now).await?, 1);

        let announcement = &platform.messages_to(20)[0];
        let content = announcement.content.as_deref().unwrap();
        assert!(content.contains("<@202>"));
        assert!(!content.contains("<@101>"));

        Ok(())
    }

    /// Tests that the entry message is removed when the giveaway cannot be stored.
    ///
    /// Expected: Err(DbErr), the posted message deleted again
    #[tokio::test]
    async fn failed_store_deletes_entry_message() -> Result<(), AppError> {
        let test = TestBuilder::new().with_giveaway_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let platform = FakePlatform::new();
        let service = GiveawayService::new(db);

        // The fake hands out message ids from 900000; take the first one.
        GiveawayFactory::new(db, "10").message_id("900000").build().await?;

        let result = service
            .start(
                &platform,
                StartGiveawayParams {
                    guild_id: 10,
                    channel_id: 20,
                    prize: "Prize".to_string(),
                    description: None,
                    minutes: 10,
                    winner_count: 1,
                    created_by: 1,
                },
                Utc::now(),
            )
            .await;

        assert!(matches!(result, Err(AppError::DbErr(_))));
        assert_eq!(
            platform.count(|c| matches!(
                c,
                Call::DeleteMessage {
                    channel_id: 20,
                    message_id: 900_000
                }
            )),
            1
        );

        Ok(())
    }

    /// Tests that a giveaway without entrants announces no winners.
    ///
    /// Expected: empty winner list, "no winners" announcement
    #[tokio::test]
    async fn no_entrants_announces_no_winners() -> Result<(), AppError> {
        let test = TestBuilder::new().with_giveaway_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let platform = FakePlatform::new();
        let service = GiveawayService::new(db);

        GiveawayFactory::new(db, "10")
            .channel_id("20")
            .message_id("30")
            .build()
            .await?;

        let winners = service.end(&platform, 10, 30, Utc::now()).await?;

        assert!(winners.is_empty());
        let announcement = &platform.messages_to(20)[0];
        assert!(announcement
            .content
            .as_deref()
            .unwrap_or_default()
            .contains("no winners"));

        Ok(())
    }

    /// Tests that reactions stop counting once a giveaway has ended.
    ///
    /// Expected: entry on an ended giveaway is ignored; unknown message is ignored
    #[tokio::test]
    async fn ignores_reactions_after_end() -> Result<(), AppError> {
        let test = TestBuilder::new().with_giveaway_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let service = GiveawayService::new(db);

        let giveaway = GiveawayFactory::new(db, "10").message_id("30").ended().build().await?;

        assert!(!service.on_reaction(&entry(30, 101), true).await?);
        assert!(!service.on_reaction(&entry(31, 101), true).await?);
        assert!(GiveawayRepository::new(db)
            .entrants(giveaway.id)
            .await?
            .is_empty());

        Ok(())
    }

    /// Tests the duration and winner-count bounds.
    ///
    /// Expected: Err(InvalidArgument) for both, nothing posted
    #[tokio::test]
    async fn rejects_out_of_range_start() -> Result<(), AppError> {
        let test = TestBuilder::new().with_giveaway_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let platform = FakePlatform::new();
        let service = GiveawayService::new(db);
        let params = StartGiveawayParams {
            guild_id: 10,
            channel_id: 20,
            prize: "Prize".to_string(),
            description: None,
            minutes: MAX_DURATION_MINUTES + 1,
            winner_count: 1,
            created_by: 1,
        };

        assert!(matches!(
            service.start(&platform, params.clone(), Utc::now()).await,
            Err(AppError::InvalidArgument(_))
        ));
        assert!(matches!(
            service
                .start(
                    &platform,
                    StartGiveawayParams {
                        minutes: 10,
                        winner_count: 0,
                        ..params
                    },
                    Utc::now()
                )
                .await,
            Err(AppError::InvalidArgument(_))
        ));
        assert!(platform.calls().is_empty());

        Ok(())
    }
}
