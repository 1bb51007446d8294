use crate::error::SyncError;
use riven::consts::{PlatformRoute, RegionalRoute};

/// Resolve the routing region that serves match-v5 for a platform, e.g. `EUW1` -> `EUROPE`.
pub fn resolve_region(platform: &str) -> Result<RegionalRoute, SyncError> {
    platform
        .trim()
        .to_uppercase()
        .parse::<PlatformRoute>()
        .map(PlatformRoute::to_regional)
        .map_err(|_| SyncError::UnknownPlatform(platform.to_string()))
}

/// Host label of a routing region, e.g. `europe`.
pub fn region_host(region: RegionalRoute) -> String {
    region.to_string().to_lowercase()
}
