//! Leveling domain types and the XP curve.
//!
//! A member at level `L` has at least `100 * L²` XP, so level 1 takes 100 XP, level 2 takes
//! 400 and level 10 takes 10 000.

use chrono::{DateTime, Utc};
use sea_orm::DbErr;

use crate::{
    model::leveling::{LevelRoleDto, LevelingConfigDto, LevelingSetupRequestDto, MemberXpDto},
    server::util::parse::{parse_optional_stored_id, parse_stored_id},
};

pub const DEFAULT_XP_MIN: i32 = 15;
pub const DEFAULT_XP_MAX: i32 = 25;
pub const DEFAULT_MILESTONES: [u32; 7] = [5, 10, 20, 30, 50, 80, 100];
pub const MAX_LEVEL: u32 = 1000;

const XP_SCALE: i64 = 100;

/// Level reached with `xp`, i.e. `floor(sqrt(xp / 100))`. Negative XP is level 0.
pub fn level_for_xp(xp: i64) -> u32 {
    if xp < XP_SCALE {
        return 0;
    }

    let mut level = ((xp / XP_SCALE) as f64).sqrt() as i64;
    // f64 rounding can land one off near perfect squares.
    while (level + 1).saturating_mul(level + 1).saturating_mul(XP_SCALE) <= xp {
        level += 1;
    }
    while level.saturating_mul(level).saturating_mul(XP_SCALE) > xp {
        level -= 1;
    }

    u32::try_from(level).unwrap_or(u32::MAX)
}

/// Smallest XP total at `level`.
pub fn xp_for_level(level: u32) -> i64 {
    i64::from(level).pow(2) * XP_SCALE
}

/// Name given to the role created for a milestone level.
pub fn role_name_for_level(level: u32) -> String {
    let tier = match level {
        0..=9 => "Beginner",
        10..=29 => "Member",
        30..=49 => "Veteran",
        50..=79 => "Elite",
        _ => "Legend",
    };

    format!("{} {}", tier, level)
}

/// Colour of the nearest default milestone.
pub fn role_color_for_level(level: u32) -> u32 {
    const COLORS: [(u32, u32); 7] = [
        (5, 0x95a5a6),
        (10, 0x3498db),
        (20, 0x2ecc71),
        (30, 0x9b59b6),
        (50, 0xe74c3c),
        (80, 0xf39c12),
        (100, 0xf1c40f),
    ];

    COLORS
        .iter()
        .min_by_key(|(milestone, _)| milestone.abs_diff(level))
        .map(|(_, color)| *color)
        .unwrap_or(0x95a5a6)
}

/// Sorts and deduplicates milestone levels.
pub fn normalize_milestones(mut milestones: Vec<u32>) -> Vec<u32> {
    milestones.sort_unstable();
    milestones.dedup();
    milestones
}

/// How far a member is into their current level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelProgress {
    pub level: u32,
    /// XP earned since reaching `level`.
    pub current: i64,
    /// XP between `level` and the next one.
    pub needed: i64,
}

impl LevelProgress {
    pub fn for_xp(xp: i64) -> Self {
        let level = level_for_xp(xp);
        let floor = xp_for_level(level);

        Self {
            level,
            current: xp.max(0) - floor,
            needed: xp_for_level(level + 1) - floor,
        }
    }

    pub fn percent(&self) -> u8 {
        if self.needed <= 0 {
            return 100;
        }
        ((self.current * 100) / self.needed).clamp(0, 100) as u8
    }

    /// `width` cells of `█` and `░`.
    pub fn bar(&self, width: usize) -> String {
        let filled = if self.needed <= 0 {
            width
        } else {
            ((self.current.max(0) as usize) * width / self.needed as usize).min(width)
        };

        format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LevelingConfig {
    pub guild_id: u64,
    pub enabled: bool,
    pub level_up_channel_id: Option<u64>,
    pub xp_min: i32,
    pub xp_max: i32,
}

impl LevelingConfig {
    /// Settings of a guild that never changed them: enabled, 15 to 25 XP per message.
    pub fn default_for(guild_id: u64) -> Self {
        Self {
            guild_id,
            enabled: true,
            level_up_channel_id: None,
            xp_min: DEFAULT_XP_MIN,
            xp_max: DEFAULT_XP_MAX,
        }
    }

    pub fn from_entity(entity: entity::leveling_config::Model) -> Result<Self, DbErr> {
        Ok(Self {
            guild_id: parse_stored_id("guild_id", &entity.guild_id)?,
            enabled: entity.enabled,
            level_up_channel_id: parse_optional_stored_id(
                "level_up_channel_id",
                entity.level_up_channel_id.as_deref(),
            )?,
            xp_min: entity.xp_min,
            xp_max: entity.xp_max,
        })
    }

    pub fn from_dto(guild_id: u64, dto: LevelingConfigDto) -> Self {
        Self {
            guild_id,
            enabled: dto.enabled,
            level_up_channel_id: dto.level_up_channel_id,
            xp_min: dto.xp_min,
            xp_max: dto.xp_max,
        }
    }

    pub fn into_dto(self) -> LevelingConfigDto {
        LevelingConfigDto {
            enabled: self.enabled,
            level_up_channel_id: self.level_up_channel_id,
            xp_min: self.xp_min,
            xp_max: self.xp_max,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemberXp {
    pub guild_id: u64,
    pub user_id: u64,
    pub xp: i64,
    pub last_message_xp_at: Option<DateTime<Utc>>,
}

impl MemberXp {
    /// A member who has not earned anything yet.
    pub fn empty(guild_id: u64, user_id: u64) -> Self {
        Self {
            guild_id,
            user_id,
            xp: 0,
            last_message_xp_at: None,
        }
    }

    pub fn from_entity(entity: entity::member_xp::Model) -> Result<Self, DbErr> {
        Ok(Self {
            guild_id: parse_stored_id("guild_id", &entity.guild_id)?,
            user_id: parse_stored_id("user_id", &entity.user_id)?,
            xp: entity.xp,
            last_message_xp_at: entity.last_message_xp_at,
        })
    }

    pub fn level(&self) -> u32 {
        level_for_xp(self.xp)
    }

    pub fn into_dto(self) -> MemberXpDto {
        MemberXpDto {
            level: self.level(),
            user_id: self.user_id,
            xp: self.xp,
        }
    }
}

/// Result of any XP change.
#[derive(Debug, Clone, PartialEq)]
pub struct XpChange {
    pub member: MemberXp,
    pub old_level: u32,
}

impl XpChange {
    pub fn new_level(&self) -> u32 {
        self.member.level()
    }

    pub fn leveled_up(&self) -> bool {
        self.new_level() > self.old_level
    }

    pub fn level_changed(&self) -> bool {
        self.new_level() != self.old_level
    }
}

/// Manual XP change by a moderator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XpAdjustment {
    Add(i64),
    SetLevel(u32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LevelRole {
    pub guild_id: u64,
    pub level: u32,
    pub role_id: u64,
}

impl LevelRole {
    pub fn from_entity(entity: entity::level_role::Model) -> Result<Self, DbErr> {
        Ok(Self {
            guild_id: parse_stored_id("guild_id", &entity.guild_id)?,
            level: entity.level.max(0) as u32,
            role_id: parse_stored_id("role_id", &entity.role_id)?,
        })
    }

    pub fn into_dto(self) -> LevelRoleDto {
        LevelRoleDto {
            level: self.level,
            role_id: self.role_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LevelingSetupRequest {
    pub guild_id: u64,
    pub milestones: Vec<u32>,
    pub requested_by: u64,
    pub requested_at: DateTime<Utc>,
}

impl LevelingSetupRequest {
    pub fn from_entity(entity: entity::leveling_setup_request::Model) -> Result<Self, DbErr> {
        let milestones = entity
            .milestones
            .split(',')
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<u32>().map_err(|_| {
                    DbErr::Custom(format!("Stored milestone '{}' is not a level", s))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            guild_id: parse_stored_id("guild_id", &entity.guild_id)?,
            milestones,
            requested_by: parse_stored_id("requested_by", &entity.requested_by)?,
            requested_at: entity.requested_at,
        })
    }

    pub fn into_dto(self) -> LevelingSetupRequestDto {
        LevelingSetupRequestDto {
            milestones: self.milestones,
            requested_at: self.requested_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Tests the XP curve at and around level boundaries.
    ///
    /// Expected: 100·L² is the first XP total of level L
    #[test]
    fn level_curve_boundaries() {
        assert_eq!(level_for_xp(-50), 0);
        assert_eq!(level_for_xp(0), 0);
        assert_eq!(level_for_xp(99), 0);
        assert_eq!(level_for_xp(100), 1);
        assert_eq!(level_for_xp(399), 1);
        assert_eq!(level_for_xp(400), 2);
        assert_eq!(level_for_xp(9_999), 9);
        assert_eq!(level_for_xp(10_000), 10);

        for level in [0, 1, 7, 50, 999, MAX_LEVEL] {
            assert_eq!(level_for_xp(xp_for_level(level)), level);
            assert_eq!(level_for_xp(xp_for_level(level + 1) - 1), level);
        }
    }

    /// Tests progress through a level.
    ///
    /// Expected: 250 XP is 150 of 300 into level 1, half a bar
    #[test]
    fn progress_within_level() {
        let progress = LevelProgress::for_xp(250);

        assert_eq!(progress.level, 1);
        assert_eq!(progress.current, 150);
        assert_eq!(progress.needed, 300);
        assert_eq!(progress.percent(), 50);
        assert_eq!(progress.bar(10), "█████░░░░░");
    }

    /// Tests milestone role naming and colours.
    ///
    /// Expected: tier names switch at 10, 30, 50 and 80; colours follow the nearest milestone
    #[test]
    fn milestone_role_style() {
        assert_eq!(role_name_for_level(5), "Beginner 5");
        assert_eq!(role_name_for_level(10), "Member 10");
        assert_eq!(role_name_for_level(30), "Veteran 30");
        assert_eq!(role_name_for_level(50), "Elite 50");
        assert_eq!(role_name_for_level(100), "Legend 100");

        assert_eq!(role_color_for_level(20), 0x2ecc71);
        assert_eq!(role_color_for_level(24), 0x2ecc71);
        assert_eq!(role_color_for_level(500), 0xf1c40f);
    }
}
