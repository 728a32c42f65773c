//! Follow-Me Region Example
//!
//! Drives the facade with a simulated provider: the user is asked for
//! authorization, a geofence is armed in sequential mode and a short walk
//! makes the geofence follow the device around.
//!
//! Run with: `cargo run -p locus --example follow_me`
//! Set `LOCUS_LOG_LEVEL=debug` to see the facade's own tracing output.

use std::sync::Arc;

use locus::prelude::*;
use locus::simulated::SimulatedProvider;
use locus::LoggingMode;

struct Narrator;

impl LocationDelegate for Narrator {
    fn did_change_authorization(&self, status: AuthorizationStatus) {
        println!("🔐 Authorization is now {}", status);
    }

    fn did_update_region(&self, region: &Region, state: RegionState) {
        println!("📍 {} -> {}", region, state);
    }

    fn did_fail(&self, error: &LocationError) {
        println!("❌ {}", error);
    }
}

fn main() -> locus::Result<()> {
    locus::init_logging(LoggingMode::Development)?;

    println!("🧭 Locus Follow-Me Example");
    println!("==========================\n");

    let provider = SimulatedProvider::new();
    let mut facade = LocationFacade::new(provider.clone(), FacadeConfig::default());
    facade.add_delegate(Arc::new(Narrator));

    let notifications = facade.notifications();

    // Arm the geofence; this parks until the user answers
    let start = Coordinate::new(52.5200, 13.4050);
    let fence = Region::circular("walk", start, 200.0);
    facade.start_region_updates(
        fence,
        true,
        None,
        Some(Box::new(|update: &RegionUpdate| {
            if update.state == RegionState::Outside {
                println!("   handler: left {}", update.region.identifier);
            }
        })),
    );
    println!("Region stream: {:?}", facade.stream_state(Stream::Region));

    provider.grant(AuthorizationStatus::AuthorizedWhenInUse);
    facade.process_events();
    println!("Region stream: {:?}\n", facade.stream_state(Stream::Region));

    let walk = [
        Coordinate::new(52.5230, 13.4090),
        Coordinate::new(52.5261, 13.4132),
        Coordinate::new(52.5290, 13.4170),
    ];
    for stop in walk {
        let Some(current) = facade.regions().into_iter().next() else {
            break;
        };
        provider.move_to(stop);
        provider.exit_region(&current);
        facade.process_events();
        if let Some(next) = facade.regions().first() {
            println!("   now monitoring {}\n", next);
        }
    }

    // Stopping disarms follow-me mode
    facade.stop_region_updates(None);
    facade.stop_region_updates(None);
    facade.process_events();

    println!("\n🔔 Notifications observed:");
    for notification in notifications.try_iter() {
        println!("  - {}", notification.name);
    }

    Ok(())
}
