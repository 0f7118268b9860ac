//! Shuffle algorithms for pass ordering
//!
//! Implements both pure random (Fisher-Yates) and smart shuffle algorithms

use crate::types::ShuffleMode;
use bramble_catalog::Track;
use rand::seq::SliceRandom;
use rand::thread_rng;
use std::collections::HashMap;

/// Order the tracks of one pass
///
/// Every call draws a fresh permutation.
pub fn shuffle_tracks(tracks: &mut [Track], mode: ShuffleMode) {
    match mode {
        ShuffleMode::Off => {
            // Catalog order
        }
        ShuffleMode::Random => {
            shuffle_random(tracks);
        }
        ShuffleMode::Smart => {
            shuffle_smart(tracks);
        }
    }
}

/// Pure random shuffle using Fisher-Yates algorithm
fn shuffle_random(tracks: &mut [Track]) {
    let mut rng = thread_rng();
    tracks.shuffle(&mut rng);
}

/// Smart shuffle algorithm
///
/// Goals:
/// - Avoid same artist playing consecutively (when possible)
/// - Distribute artists evenly throughout the pass
/// - Maintain some randomness (not fully deterministic)
///
/// Algorithm:
/// 1. Group tracks by artist
/// 2. Randomize within artist groups and randomize group order
/// 3. Round-robin over the groups
fn shuffle_smart(tracks: &mut [Track]) {
    if tracks.len() <= 2 {
        shuffle_random(tracks);
        return;
    }

    let mut rng = thread_rng();

    let mut by_artist: HashMap<&str, Vec<Track>> = HashMap::new();
    for track in tracks.iter() {
        by_artist
            .entry(track.artist.as_str())
            .or_default()
            .push(track.clone());
    }

    let mut groups: Vec<Vec<Track>> = by_artist.into_values().collect();
    for group in &mut groups {
        group.shuffle(&mut rng);
    }
    groups.shuffle(&mut rng);

    let mut result = Vec::with_capacity(tracks.len());
    let mut round = 0;
    while result.len() < tracks.len() {
        for group in &groups {
            if let Some(track) = group.get(round) {
                result.push(track.clone());
            }
        }
        round += 1;
    }

    for (slot, track) in tracks.iter_mut().zip(result) {
        *slot = track;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn create_test_track(id: &str, artist: &str) -> Track {
        Track {
            id: id.to_string(),
            title: format!("Song {}", id),
            artist: artist.to_string(),
            album: "Test Album".to_string(),
            path: format!("{}/{}.mp3", artist, id),
            suffix: "mp3".to_string(),
            is_video: false,
            track_number: None,
            duration: Some(180),
        }
    }

    fn ids(tracks: &[Track]) -> Vec<String> {
        tracks.iter().map(|t| t.id.clone()).collect()
    }

    fn consecutive_same_artist(tracks: &[Track]) -> usize {
        tracks
            .windows(2)
            .filter(|pair| pair[0].artist == pair[1].artist)
            .count()
    }

    #[test]
    fn shuffle_mode_off_no_change() {
        let mut tracks = vec![
            create_test_track("1", "Artist A"),
            create_test_track("2", "Artist B"),
            create_test_track("3", "Artist C"),
        ];
        let original = ids(&tracks);

        shuffle_tracks(&mut tracks, ShuffleMode::Off);

        assert_eq!(ids(&tracks), original);
    }

    #[test]
    fn random_shuffle_preserves_all_tracks() {
        let mut tracks: Vec<Track> = (0..10)
            .map(|i| create_test_track(&i.to_string(), "Artist"))
            .collect();

        shuffle_tracks(&mut tracks, ShuffleMode::Random);

        let unique: HashSet<String> = ids(&tracks).into_iter().collect();
        assert_eq!(unique.len(), 10);
    }

    #[test]
    fn random_passes_differ() {
        let tracks: Vec<Track> = (0..8)
            .map(|i| create_test_track(&i.to_string(), "Artist"))
            .collect();

        // 8! orderings; ten identical draws in a row would be a broken shuffle
        let first = {
            let mut pass = tracks.clone();
            shuffle_tracks(&mut pass, ShuffleMode::Random);
            ids(&pass)
        };
        let differs = (0..10).any(|_| {
            let mut pass = tracks.clone();
            shuffle_tracks(&mut pass, ShuffleMode::Random);
            ids(&pass) != first
        });
        assert!(differs);
    }

    #[test]
    fn smart_shuffle_interleaves_two_artists() {
        let mut tracks = vec![
            create_test_track("1a", "Artist A"),
            create_test_track("1b", "Artist A"),
            create_test_track("1c", "Artist A"),
            create_test_track("2a", "Artist B"),
            create_test_track("2b", "Artist B"),
            create_test_track("2c", "Artist B"),
        ];

        shuffle_tracks(&mut tracks, ShuffleMode::Smart);

        assert_eq!(consecutive_same_artist(&tracks), 0);
    }

    #[test]
    fn smart_shuffle_uneven_groups() {
        let mut tracks: Vec<Track> = (0..20)
            .map(|i| create_test_track(&format!("t{}", i), &format!("Artist {}", i % 5)))
            .collect();
        tracks.push(create_test_track("extra1", "Artist 0"));
        tracks.push(create_test_track("extra2", "Artist 0"));

        shuffle_tracks(&mut tracks, ShuffleMode::Smart);

        let unique: HashSet<String> = ids(&tracks).into_iter().collect();
        assert_eq!(unique.len(), 22);
        assert!(consecutive_same_artist(&tracks) <= 2);
    }

    #[test]
    fn smart_shuffle_single_artist() {
        let mut tracks = vec![
            create_test_track("1", "Artist A"),
            create_test_track("2", "Artist A"),
            create_test_track("3", "Artist A"),
        ];

        shuffle_tracks(&mut tracks, ShuffleMode::Smart);

        assert_eq!(tracks.len(), 3);
    }

    #[test]
    fn smart_shuffle_empty() {
        let mut tracks: Vec<Track> = vec![];
        shuffle_tracks(&mut tracks, ShuffleMode::Smart);
        assert!(tracks.is_empty());
    }
}
