// SPDX-License-Identifier: MPL-2.0
//! Buffer progress commands before the engine exists, then bind and replay.

use notify_stack::{DeferredHandle, Notification, NotificationCenter, TransientNotification};
use std::thread;
use std::time::{Duration, Instant};

fn main() {
    // The operation starts reporting before any presentation layer exists.
    let deferred = DeferredHandle::unbound();
    let early = deferred.as_handle();
    early.update_progress(0.3, Some("3 of 10"));
    early.update_progress(0.8, Some("8 of 10"));
    early.complete(Some("Import finished"));
    println!(
        "🕐 Buffered {} commands before startup\n",
        deferred.buffered_len()
    );

    // Engine comes up, a renderer subscribes, the buffer replays in order.
    let mut center = NotificationCenter::new();
    center.subscribe(|snapshot| {
        for notification in snapshot {
            println!(
                "  → {} {:?} ({})",
                notification.id(),
                notification.state(),
                notification.subtitle().unwrap_or("no subtitle")
            );
        }
        if snapshot.is_empty() {
            println!("  → (empty)");
        }
    });
    center.subscribe_transients(|stack| {
        for transient in stack {
            println!("  🔔 slot {}: {}", transient.slot(), transient.message());
        }
    });

    println!("🚀 Engine up, binding the deferred handle\n");
    let live = center.show(Notification::new("import-1", "Importing"));
    deferred.bind(live);

    center.enqueue_transient(TransientNotification::success("Library is up to date"));

    println!("\n⏳ Letting timers run\n");
    while center.has_notifications() || center.has_transients() {
        thread::sleep(Duration::from_millis(250));
        center.tick(Instant::now());
    }

    println!("\n👋 Done");
}
