//! Basic example of a quern reporting items it cannot grind.
//!
//! A player holds right-click on a quern with flint in the input slot. The
//! interaction fires every 50 ms, but the notice goes out at most once per
//! 500 ms window. Swapping to bone restarts the window immediately.

use quern_notify::{
    CapabilityDescriptor, DispatchOutcome, ItemStack, LocationKey, Notifier, Role,
};
use std::time::Duration;
use tracing_subscriber::prelude::*;

fn main() {
    // Notices go through `tracing` on the `quern_notify::notice` target
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    let notifier = Notifier::builder()
        .with_window(Duration::from_millis(500))
        .build()
        .unwrap();

    let quern = LocationKey::new(12, 70, -4);
    let flint = ItemStack::new("game:flint").named("Flint");
    let bone = ItemStack::new("game:bone").named("Bone");
    let spelt = ItemStack::new("game:grain-spelt")
        .named("Spelt")
        .with_capability(CapabilityDescriptor::with_result("game:flour-spelt"));

    println!("=== Quern Notification Example ===\n");
    println!("Window: 500 ms, interaction every 50 ms\n");

    let mut now = 0i64;
    for (item, ticks) in [(&flint, 24), (&bone, 6), (&spelt, 4)] {
        println!("Holding {} for {} ticks:", item.name.as_deref().unwrap_or("?"), ticks);
        for _ in 0..ticks {
            let outcome = notifier.notify(quern, Some(item), now, Role::Authoritative);
            if outcome == DispatchOutcome::Delivered {
                println!("  t={now:>5} ms  notified");
            }
            now += 50;
        }
        println!();
    }

    // Clients observe the same interactions but never notify
    let outcome = notifier.notify(quern, Some(&flint), now, Role::Observer);
    println!("Client-side call: {outcome:?}\n");

    let snapshot = notifier.metrics().snapshot();
    println!("=== Metrics ===");
    println!("Events seen:       {}", snapshot.events_seen);
    println!("Delivered:         {}", snapshot.notifications_delivered);
    println!("Suppressed:        {}", snapshot.duplicates_suppressed);
    println!("Acceptable items:  {}", snapshot.subjects_acceptable);
    println!("Suppression rate:  {:.1}%", snapshot.suppression_rate() * 100.0);
}
