/// Two keystrokes closer together than this can collide.
pub const JAM_WINDOW_MS: i64 = 100;

/// Physical neighbours of each letter on a QWERTY typewriter.
pub fn adjacent_keys(key: char) -> &'static [char] {
    match key {
        'q' => &['w', 'a'],
        'w' => &['q', 'e', 'a', 's'],
        'e' => &['w', 'r', 's', 'd'],
        'r' => &['e', 't', 'd', 'f'],
        't' => &['r', 'y', 'f', 'g'],
        'y' => &['t', 'u', 'g', 'h'],
        'u' => &['y', 'i', 'h', 'j'],
        'i' => &['u', 'o', 'j', 'k'],
        'o' => &['i', 'p', 'k', 'l'],
        'p' => &['o', 'l'],
        'a' => &['q', 'w', 's', 'z'],
        's' => &['w', 'e', 'a', 'd', 'z', 'x'],
        'd' => &['e', 'r', 's', 'f', 'x', 'c'],
        'f' => &['r', 't', 'd', 'g', 'c', 'v'],
        'g' => &['t', 'y', 'f', 'h', 'v', 'b'],
        'h' => &['y', 'u', 'g', 'j', 'b', 'n'],
        'j' => &['u', 'i', 'h', 'k', 'n', 'm'],
        'k' => &['i', 'o', 'j', 'l', 'm'],
        'l' => &['o', 'p', 'k'],
        'z' => &['a', 's', 'x'],
        'x' => &['z', 's', 'd', 'c'],
        'c' => &['x', 'd', 'f', 'v'],
        'v' => &['c', 'f', 'g', 'b'],
        'b' => &['v', 'g', 'h', 'n'],
        'n' => &['b', 'h', 'j', 'm'],
        'm' => &['n', 'j', 'k'],
        _ => &[],
    }
}

pub(crate) fn lower(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

/// Whether striking `new_key` now collides with the typebar of `last_key`.
pub fn is_jam(
    new_key: char,
    last_key: Option<char>,
    last_key_timestamp: i64,
    now: i64,
    jam_simulation_enabled: bool,
) -> bool {
    if !jam_simulation_enabled {
        return false;
    }
    let Some(last_key) = last_key else {
        return false;
    };

    now.saturating_sub(last_key_timestamp) < JAM_WINDOW_MS
        && adjacent_keys(lower(last_key)).contains(&lower(new_key))
}

/// Canonical histogram key for an unordered pair, e.g. `"a-s"`.
pub fn pair_id(a: char, b: char) -> String {
    let (a, b) = (lower(a), lower(b));
    if a <= b {
        format!("{a}-{b}")
    } else {
        format!("{b}-{a}")
    }
}
