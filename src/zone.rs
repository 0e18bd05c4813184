use crate::dns::Name;

/// The zones this server is authoritative for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZoneSet(Vec<Name>);

impl ZoneSet {
    pub fn new<I: IntoIterator<Item = Name>>(zones: I) -> Self {
        Self(
            zones
                .into_iter()
                .map(|mut zone| {
                    zone.set_fqdn(true);
                    zone
                })
                .collect(),
        )
    }

    /// Returns the most specific zone containing `name`.
    ///
    /// When several configured zones have the same depth the first one wins.
    pub fn matches(&self, name: &Name) -> Option<&Name> {
        self.0
            .iter()
            .filter(|zone| zone.zone_of(name))
            .fold(None, |found: Option<&Name>, zone| match found {
                Some(f) if f.num_labels() >= zone.num_labels() => Some(f),
                _ => Some(zone),
            })
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Name> {
        self.0.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The part of `name` in front of `zone`, e.g. `host1` for `host1.example.org.`
/// in `example.org.`. Empty when `name` is the zone apex.
pub fn relative_label(zone: &Name, name: &Name) -> String {
    let depth = name.num_labels().saturating_sub(zone.num_labels()) as usize;

    name.iter()
        .take(depth)
        .map(String::from_utf8_lossy)
        .collect::<Vec<_>>()
        .join(".")
}
