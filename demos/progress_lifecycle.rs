// SPDX-License-Identifier: MPL-2.0
//! Walk one notification through its full lifecycle with a console renderer.

use notify_stack::{Notification, NotificationCenter, NotificationState};
use std::thread;
use std::time::{Duration, Instant};

fn main() {
    let mut center = NotificationCenter::new();

    center.subscribe(|snapshot| {
        if snapshot.is_empty() {
            println!("  (stack empty)");
            return;
        }
        for notification in snapshot {
            let marker = match notification.state() {
                NotificationState::Pending => "⏸",
                NotificationState::Running => "▶",
                NotificationState::Completed => "✅",
                NotificationState::Failed => "❌",
            };
            let progress = notification
                .progress()
                .map_or_else(|| "--".to_owned(), |p| p.to_string());
            println!(
                "  {marker} {} [{progress}] {}",
                notification.id(),
                notification.title()
            );
        }
    });

    println!("📋 Showing a notification\n");
    let handle = center.show(Notification::new("export-1", "Exporting frames"));

    for step in 1..=4 {
        thread::sleep(Duration::from_millis(150));
        let subtitle = format!("{step} of 4");
        handle.update_progress(step as f32 / 4.0, Some(subtitle.as_str()));
    }

    handle.complete(Some("Export finished"));

    println!("\n⏳ Waiting for eviction (completed records linger 2s)\n");
    while center.has_notifications() {
        thread::sleep(Duration::from_millis(250));
        center.tick(Instant::now());
    }

    println!("\n👋 Done");
}
