/// Text rendering of decoded metadata

use crate::filesystem::{Catalog, CatalogFile, DiskReport, FileChain, VolumeInfo};
use crate::map::render_free_list;
use std::fmt::Write;

/// Render the VTOC fields and per-track free list
pub fn render_volume(volume: &VolumeInfo) -> String {
    let mut out = String::new();
    let field = |out: &mut String, label: &str, value: u32| {
        let _ = writeln!(out, "{:<32} 0x{:02X} ({})", label, value, value);
    };

    field(&mut out, "First catalog track:", volume.first_catalog.track as u32);
    field(&mut out, "First catalog sector:", volume.first_catalog.sector as u32);
    field(&mut out, "DOS release:", volume.dos_release as u32);
    field(&mut out, "Diskette volume:", volume.disk_vol as u32);
    field(&mut out, "Max track/sector pairs:", volume.max_ts_pairs as u32);
    field(&mut out, "Last allocated track:", volume.last_track as u32);
    field(&mut out, "Allocation direction:", volume.last_direction as u32);
    out.push('\n');
    field(&mut out, "Tracks per disk:", volume.tracks_per_disk as u32);
    field(&mut out, "Sectors per track:", volume.sectors_per_track as u32);
    field(&mut out, "Bytes per sector:", volume.bytes_per_sector as u32);
    out.push('\n');

    let _ = writeln!(
        out,
        "Free sectors: {} of {}",
        volume.free_map.free_count(),
        volume.total_sectors()
    );
    out.push_str(&render_free_list(volume));
    out
}

fn render_chain(out: &mut String, chain: &FileChain) {
    for (nr, ts) in chain.index.iter().enumerate() {
        let _ = writeln!(
            out,
            "\tT/S list #{:02}  file offset 0x{:04X}  at {}  next {}",
            nr, ts.file_offset, ts.address, ts.next
        );
        for data in ts.data_sectors() {
            let _ = writeln!(out, "\t\toffset 0x{:05X}  {}", data.offset, data.address);
        }
    }
}

fn render_file(out: &mut String, file: &CatalogFile) {
    let entry = &file.entry;
    let locked = if entry.is_locked() { '*' } else { ' ' };
    let letter = entry.type_letter().unwrap_or('?');

    let _ = writeln!(
        out,
        "{}{} {:03} {} (type 0x{:02X}, first {}, catalog {} slot {})",
        locked,
        letter,
        entry.size,
        entry.trimmed_name(),
        entry.file_type,
        entry.first,
        file.catalog_sector,
        file.slot
    );

    match (&file.chain, entry.deleted_track()) {
        (None, Some(track)) => {
            let _ = writeln!(out, "\tDELETED (original track {})", track);
        }
        (None, None) => {}
        (Some(Err(e)), _) => {
            let _ = writeln!(out, "\tERROR: {}", e);
        }
        (Some(Ok(chain)), _) => {
            render_chain(out, chain);
            if let Err(e) = file.verify_size() {
                let _ = writeln!(out, "\tWARNING: {}", e);
            }
        }
    }
}

/// Render every catalog entry with its TS-list chain
pub fn render_catalog(catalog: &Catalog) -> String {
    let mut out = String::new();
    for sector in &catalog.sectors {
        let _ = writeln!(out, "Catalog sector {} (next {})", sector.address, sector.next);
        for file in catalog
            .files
            .iter()
            .filter(|f| f.catalog_sector == sector.address)
        {
            render_file(&mut out, file);
        }
    }

    if let Some(e) = &catalog.truncated {
        let _ = writeln!(out, "CATALOG INCOMPLETE: {}", e);
    }

    let _ = writeln!(
        out,
        "{} files, {} deleted, {} unused slots",
        catalog.live_files().count(),
        catalog.deleted_files().count(),
        catalog.unused_slots()
    );
    out
}

/// Render a whole decode result
pub fn render_report(report: &DiskReport) -> String {
    let mut out = render_volume(&report.volume);
    out.push('\n');
    out.push_str(&render_catalog(&report.catalog));
    out
}
