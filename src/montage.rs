//! Channel canonicalization onto the fixed 10-20 reference montage.
//!
//! CHB-MIT channel names mix bipolar derivations (`FP1-F7`), duplicated
//! derivations (`T8-P8-0`, `T8-P8-1`), and occasional extras. This module
//! maps known names onto the 19-label reference montage, drops collisions
//! (first-seen-wins), and leaves unknown labels behind entirely.
use crate::recording::Recording;

/// The fixed 19-channel reference montage (10-20 system), order-significant.
pub const TARGET_CHANNELS: [&str; 19] = [
    "Fp1", "F7", "T7", "P7", "O1", "F3", "C3", "P3", "Fp2", "F4", "C4", "P4",
    "O2", "F8", "T8", "P8", "Fz", "Cz", "Pz",
];

/// Raw/bipolar/duplicated label → canonical label. Every value is a member
/// of [`TARGET_CHANNELS`].
pub const MAPPING_TABLE: [(&str, &str); 22] = [
    ("FP1-F7", "Fp1"),
    ("F7-T7", "F7"),
    ("T7-P7", "T7"),
    ("P7-O1", "P7"),
    ("FP1-F3", "F3"),
    ("F3-C3", "C3"),
    ("C3-P3", "P3"),
    ("P3-O1", "O1"),
    ("FP2-F4", "Fp2"),
    ("F4-C4", "F4"),
    ("C4-P4", "C4"),
    ("P4-O2", "P4"),
    ("FP2-F8", "F8"),
    ("F8-T8", "T8"),
    ("T8-P8", "P8"),
    ("P8-O2", "O2"),
    ("FZ-CZ", "Fz"),
    ("CZ-PZ", "Cz"),
    ("PZ-OZ", "Pz"),
    ("T8-P8-0", "P8"),
    ("T8-P8-1", "P8"),
    ("T8-P8-2", "P8"),
];

fn lookup(label: &str) -> Option<&'static str> {
    MAPPING_TABLE
        .iter()
        .find(|(k, _)| *k == label)
        .map(|(_, v)| *v)
}

/// Outcome of planning canonicalization over one label list.
#[derive(Debug, Clone, Default)]
pub struct RenamePlan {
    /// Original label → canonical label, in input order.
    pub rename: Vec<(String, String)>,
    /// Labels whose canonical target was already claimed; removed outright.
    pub drop: Vec<String>,
}

/// Plan renames and drops for a channel label list.
///
/// For each label, look it up in [`MAPPING_TABLE`]; three-part compound
/// labels absent from the table are retried with only their first two
/// hyphen-delimited segments. Labels still unresolved are simply not carried
/// forward. When a canonical target is claimed twice, the first-encountered
/// label wins and the later one lands in the drop list (deterministic only
/// if the input order is).
pub fn plan_renames(ch_names: &[String]) -> RenamePlan {
    let mut plan = RenamePlan::default();
    let mut used_targets: Vec<&str> = Vec::new();

    for ch in ch_names {
        let target = match lookup(ch) {
            Some(t) => Some(t),
            None => {
                let parts: Vec<&str> = ch.split('-').collect();
                if parts.len() > 2 {
                    lookup(&parts[..2].join("-"))
                } else {
                    None
                }
            }
        };
        let Some(target) = target else { continue };

        if used_targets.contains(&target) {
            plan.drop.push(ch.clone());
        } else {
            plan.rename.push((ch.clone(), target.to_string()));
            used_targets.push(target);
        }
    }
    plan
}

/// Canonicalize a recording: drop collisions, rename surviving channels, and
/// restrict to canonical channels in [`TARGET_CHANNELS`] order.
///
/// After this every remaining label is a montage member and no two channels
/// share a label. The caller decides whether the surviving count (< 5) means
/// the file must be skipped.
pub fn canonicalize(rec: &Recording) -> Recording {
    let plan = plan_renames(&rec.ch_names);

    // Drops first, then renames; unmapped channels fall away with the final
    // canonical pick.
    let mut surviving: Vec<(usize, String)> = Vec::new();
    for (i, name) in rec.ch_names.iter().enumerate() {
        if plan.drop.contains(name) {
            continue;
        }
        let renamed = plan
            .rename
            .iter()
            .find(|(orig, _)| orig == name)
            .map(|(_, target)| target.clone())
            .unwrap_or_else(|| name.clone());
        surviving.push((i, renamed));
    }

    // Pick canonical channels in montage order.
    let mut picked: Vec<usize> = Vec::new();
    let mut names: Vec<String> = Vec::new();
    for &canon in TARGET_CHANNELS.iter() {
        if let Some((i, n)) = surviving.iter().find(|(_, n)| n.as_str() == canon) {
            picked.push(*i);
            names.push(n.clone());
        }
    }

    let mut out = rec.pick(&picked);
    out.ch_names = names;
    out
}
