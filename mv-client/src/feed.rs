//! Snapshot sources: JSON lines from a file or stdin, or a synthetic demo.

use std::f32::consts::TAU;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use bevy::prelude::Vec3;
use mv_utils::{EntitySnapshot, FeedMessage, FeedSender, parse_feed_line};
use tracing::{info, warn};

const DEMO_TICK: Duration = Duration::from_millis(50);
const DEMO_RADIUS: f32 = 4.0;
const DEMO_ANGULAR_SPEED: f32 = 0.4;
const DEMO_ENTITIES: [&str; 7] = [
    "player", "zombie", "skeleton", "creeper", "pig", "cow", "ghast",
];

/// Forwards every parsed line to `sender` until the input ends or the
/// receiving side goes away. Returns how many messages were sent.
pub fn read_feed(reader: impl BufRead, sender: &FeedSender) -> usize {
    let mut sent = 0;
    for (line_no, line) in reader.lines().enumerate() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                warn!("feed read failed: {err}");
                break;
            }
        };
        let message = match parse_feed_line(&line) {
            Ok(Some(message)) => message,
            Ok(None) => continue,
            Err(err) => {
                warn!("skipping feed line {}: {err}", line_no + 1);
                continue;
            }
        };
        if sender.0.send(message).is_err() {
            break;
        }
        sent += 1;
    }
    sent
}

pub fn spawn_feed_reader(path: Option<PathBuf>, sender: FeedSender) -> io::Result<JoinHandle<()>> {
    let reader: Box<dyn BufRead + Send> = match &path {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(BufReader::new(io::stdin())),
    };
    Ok(thread::spawn(move || {
        let sent = read_feed(reader, &sender);
        info!("snapshot feed closed after {sent} messages");
    }))
}

/// Entities walking a circle, one of them sneaking and one attacking now and
/// then, plus an unknown type drawn as a placeholder.
pub fn demo_snapshots(tick: u64) -> Vec<EntitySnapshot> {
    let t = tick as f32 * DEMO_TICK.as_secs_f32();
    DEMO_ENTITIES
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let angle = t * DEMO_ANGULAR_SPEED + idx as f32 * TAU / DEMO_ENTITIES.len() as f32;
            let pos = Vec3::new(angle.cos() * DEMO_RADIUS, 0.0, angle.sin() * DEMO_RADIUS);
            // Heading is the circle tangent; models face -Z at yaw 0.
            let heading = Vec3::new(-angle.sin(), 0.0, angle.cos());
            let yaw = (-heading.x).atan2(-heading.z);

            let mut snapshot = EntitySnapshot::new(idx as i64 + 1)
                .with_pos(pos)
                .with_yaw(yaw);
            if tick == 0 {
                snapshot.name = Some(name.to_string());
                if *name == "player" {
                    snapshot.username = Some("Steve".to_string());
                }
            }
            match *name {
                "player" => snapshot.is_sneaking = Some((tick / 60) % 2 == 1),
                "zombie" if tick % 40 == 0 => snapshot.attack = Some(true),
                _ => {}
            }
            snapshot
        })
        .collect()
}

pub fn spawn_demo_feed(sender: FeedSender) -> JoinHandle<()> {
    thread::spawn(move || {
        info!("running demo feed with {} entities", DEMO_ENTITIES.len());
        for tick in 0u64.. {
            for snapshot in demo_snapshots(tick) {
                if sender.0.send(FeedMessage::Snapshot(snapshot)).is_err() {
                    return;
                }
            }
            thread::sleep(DEMO_TICK);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mv_utils::feed_channel;
    use std::io::Cursor;

    #[test]
    fn reader_skips_bad_lines() {
        let (sender, receiver) = feed_channel();
        let input = concat!(
            "{\"id\": 1, \"name\": \"pig\"}\n",
            "not json\n",
            "\n",
            "{\"clear\": true}\n",
            "{\"id\": 1, \"delete\": true}\n",
        );
        assert_eq!(read_feed(Cursor::new(input), &sender), 3);

        let messages: Vec<_> = receiver.0.try_iter().collect();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1], FeedMessage::Clear);
        assert_eq!(
            messages[2],
            FeedMessage::Snapshot(EntitySnapshot::deleted(1))
        );
    }

    #[test]
    fn reader_stops_when_receiver_is_gone() {
        let (sender, receiver) = feed_channel();
        drop(receiver);
        assert_eq!(read_feed(Cursor::new("{\"id\": 1}\n{\"id\": 2}\n"), &sender), 0);
    }

    #[test]
    fn demo_names_entities_once() {
        let first = demo_snapshots(0);
        assert_eq!(first.len(), DEMO_ENTITIES.len());
        assert!(first.iter().all(|s| s.name.is_some() && s.pos.is_some()));
        assert_eq!(first[0].username.as_deref(), Some("Steve"));
        assert_eq!(first[1].attack, Some(true));

        let later = demo_snapshots(1);
        assert!(later.iter().all(|s| s.name.is_none()));
        assert_eq!(later[1].attack, None);
        let moved = later[0].position().unwrap() - first[0].position().unwrap();
        assert!(moved.length() > 0.0);
    }
}
