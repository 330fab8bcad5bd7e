/// Free-sector map rendering

use crate::filesystem::VolumeInfo;
use crate::image::TsAddress;
use std::fmt::Write;

/// Glyph for a free sector
pub const BLOCK_FREE: char = '\u{2591}'; // ░
/// Glyph for a used sector
pub const BLOCK_USED: char = '\u{2593}'; // ▓

/// Render the VTOC bitmap as a grid: one column per track, sector 0 on the bottom row
pub fn render_free_map(volume: &VolumeInfo) -> String {
    let mut out = String::new();
    let num_tracks = volume.free_map.tracks();
    let sectors = volume.sectors_per_track.min(16);

    if num_tracks == 0 || sectors == 0 {
        out.push_str("No tracks described by the VTOC.\n");
        return out;
    }

    let _ = writeln!(
        out,
        "=== Free Sector Map (Volume {:03}) ===",
        volume.disk_vol
    );
    let _ = writeln!(out, "Legend: {} free  {} used", BLOCK_FREE, BLOCK_USED);
    out.push('\n');

    for sector in (0..sectors).rev() {
        let _ = write!(out, "{:>2} ", sector);
        for track in 0..num_tracks {
            let free = volume
                .free_map
                .is_free(TsAddress::new(track as u8, sector));
            out.push(if free { BLOCK_FREE } else { BLOCK_USED });
        }
        out.push('\n');
    }

    // Track axis, labelled every 5 tracks
    out.push_str("   ");
    let mut printed_cols = vec![false; num_tracks];
    for track in 0..num_tracks {
        if track % 5 == 0 && !printed_cols[track] {
            for (i, digit) in track.to_string().chars().enumerate() {
                let col = track + i;
                if col < num_tracks {
                    out.push(digit);
                    printed_cols[col] = true;
                }
            }
        } else if !printed_cols[track] {
            out.push(' ');
        }
    }
    out.push('\n');

    out
}

/// Render one line per track listing its free sectors
pub fn render_free_list(volume: &VolumeInfo) -> String {
    let mut out = String::new();
    for track in 0..volume.free_map.tracks() {
        let sectors: Vec<String> = volume
            .free_map
            .free_sectors(track as u8)
            .iter()
            .map(|s| s.to_string())
            .collect();
        let _ = writeln!(out, "Track {:02}: {}", track, sectors.join(" "));
    }
    out
}
