use std::collections::BTreeMap;

use crate::model::{PlayerGroup, PlayerObservation};

/// Normalized identity form of a player or team name: lower-cased,
/// diacritics folded, whitespace collapsed to single spaces.
pub fn identity_key(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_space = false;
    for c in raw.trim().chars() {
        if c.is_whitespace() {
            pending_space = !out.is_empty();
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        push_folded(&mut out, c);
    }
    out
}

/// Fold common Latin diacritics to their ASCII base, lower-casing along the
/// way. Covers the alphabets of the supported leagues (Turkish, German,
/// general Western European).
fn push_folded(out: &mut String, c: char) {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => out.push('a'),
        'è' | 'é' | 'ê' | 'ë' | 'È' | 'É' | 'Ê' | 'Ë' => out.push('e'),
        'ì' | 'í' | 'î' | 'ï' | 'ı' | 'Ì' | 'Í' | 'Î' | 'Ï' | 'İ' => out.push('i'),
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ø' => out.push('o'),
        'ù' | 'ú' | 'û' | 'ü' | 'Ù' | 'Ú' | 'Û' | 'Ü' => out.push('u'),
        'ç' | 'Ç' => out.push('c'),
        'ğ' | 'Ğ' => out.push('g'),
        'ş' | 'Ş' => out.push('s'),
        'ñ' | 'Ñ' => out.push('n'),
        'ý' | 'Ý' => out.push('y'),
        'ß' => out.push_str("ss"),
        'æ' | 'Æ' => out.push_str("ae"),
        'œ' | 'Œ' => out.push_str("oe"),
        'ð' | 'Ð' => out.push('d'),
        'þ' | 'Þ' => out.push_str("th"),
        _ => out.extend(c.to_lowercase()),
    }
}

/// Group observations that describe the same real player.
///
/// Observations agree when their normalized names match and their teams do
/// not disagree: a missing team is a wildcard that matches any team, so one
/// source omitting affiliation never splits a player in two. Input order
/// (adapter completion order) never affects the output: observations are
/// sorted into a canonical order before grouping.
pub fn resolve(mut observations: Vec<PlayerObservation>) -> Vec<PlayerGroup> {
    observations.sort_by(|a, b| {
        let ka = (
            identity_key(&a.player_name),
            a.team_name.as_deref().map(identity_key),
            a.source_id.clone(),
        );
        let kb = (
            identity_key(&b.player_name),
            b.team_name.as_deref().map(identity_key),
            b.source_id.clone(),
        );
        ka.cmp(&kb)
    });

    // Bucket by normalized name first; team disambiguation happens per bucket.
    let mut buckets: BTreeMap<String, Vec<PlayerObservation>> = BTreeMap::new();
    for obs in observations {
        buckets
            .entry(identity_key(&obs.player_name))
            .or_default()
            .push(obs);
    }

    let mut groups = Vec::new();
    for (name_key, bucket) in buckets {
        groups.extend(split_bucket_by_team(name_key, bucket));
    }
    groups
}

fn split_bucket_by_team(name_key: String, bucket: Vec<PlayerObservation>) -> Vec<PlayerGroup> {
    let mut by_team: BTreeMap<String, Vec<PlayerObservation>> = BTreeMap::new();
    let mut wildcards: Vec<PlayerObservation> = Vec::new();
    for obs in bucket {
        match obs.team_name.as_deref().map(identity_key) {
            Some(team_key) => by_team.entry(team_key).or_default().push(obs),
            None => wildcards.push(obs),
        }
    }

    if by_team.len() <= 1 {
        // Zero or one distinct team: everything is one player.
        let (team_key, mut observations) = by_team
            .into_iter()
            .next()
            .map(|(k, v)| (Some(k), v))
            .unwrap_or((None, Vec::new()));
        observations.extend(wildcards);
        return vec![PlayerGroup {
            name_key,
            team_key,
            observations,
        }];
    }

    // Two or more distinct teams really do disagree: separate players.
    // Teamless observations match any of them; attach to the team with the
    // most observations (lexicographically first on ties) so the outcome is
    // deterministic.
    let wildcard_home = by_team
        .iter()
        .max_by(|(ka, va), (kb, vb)| va.len().cmp(&vb.len()).then(kb.cmp(ka)))
        .map(|(k, _)| k.clone());

    by_team
        .into_iter()
        .map(|(team_key, mut observations)| {
            if Some(&team_key) == wildcard_home.as_ref() {
                observations.extend(wildcards.iter().cloned());
            }
            PlayerGroup {
                name_key: name_key.clone(),
                team_key: Some(team_key),
                observations,
            }
        })
        .collect()
}
