use {logrelay_common::ChannelId, logrelay_config::RouteConfig};

use crate::{Error, Result};

/// Tag of the entry that matches every lookup.
pub const WILDCARD: &str = "";

/// One routing-table entry: a tag and the channels it fans out to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub tag: String,
    pub channels: Vec<ChannelId>,
}

impl Route {
    /// Whether a lookup for `tag` visits this entry.
    #[must_use]
    pub fn matches(&self, tag: &str) -> bool {
        self.tag == tag || self.tag.is_empty()
    }

    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.tag.is_empty()
    }
}

/// Ordered tag → channel list mapping with unique tags.
///
/// Configured by the owning application through `&mut self` before it is
/// shared; lookups take `&self` and never mutate, so a shared table needs no
/// locking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutingTable {
    routes: Vec<Route>,
}

impl RoutingTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from config routes, rejecting repeated tags.
    pub fn try_from_routes(routes: &[RouteConfig]) -> Result<Self> {
        let mut table = Self::new();
        for (index, route) in routes.iter().enumerate() {
            if table.get(&route.tag).is_some() {
                return Err(Error::DuplicateTag {
                    tag: route.tag.clone(),
                    index,
                });
            }
            table.routes.push(Route {
                tag: route.tag.clone(),
                channels: route.channels.clone(),
            });
        }
        Ok(table)
    }

    /// Set the channels for `tag`, returning the previous list.
    ///
    /// A new tag is appended; an existing tag keeps its position.
    pub fn insert(
        &mut self,
        tag: impl Into<String>,
        channels: impl IntoIterator<Item = ChannelId>,
    ) -> Option<Vec<ChannelId>> {
        let tag = tag.into();
        let channels: Vec<ChannelId> = channels.into_iter().collect();
        match self.routes.iter_mut().find(|r| r.tag == tag) {
            Some(existing) => Some(std::mem::replace(&mut existing.channels, channels)),
            None => {
                self.routes.push(Route { tag, channels });
                None
            },
        }
    }

    /// Remove the entry for `tag`, returning its channels.
    pub fn remove(&mut self, tag: &str) -> Option<Vec<ChannelId>> {
        let index = self.routes.iter().position(|r| r.tag == tag)?;
        Some(self.routes.remove(index).channels)
    }

    /// Replace the whole table. Later duplicates overwrite earlier ones in
    /// place.
    pub fn set_all<T, I>(&mut self, routes: impl IntoIterator<Item = (T, I)>)
    where
        T: Into<String>,
        I: IntoIterator<Item = ChannelId>,
    {
        self.routes.clear();
        for (tag, channels) in routes {
            self.insert(tag, channels);
        }
    }

    #[must_use]
    pub fn get(&self, tag: &str) -> Option<&[ChannelId]> {
        self.routes
            .iter()
            .find(|r| r.tag == tag)
            .map(|r| r.channels.as_slice())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }

    /// Entries a lookup for `tag` visits, in table order.
    pub fn matching<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Route> + 'a {
        self.routes.iter().filter(move |r| r.matches(tag))
    }

    /// Channels that should receive an entry tagged `tag`.
    ///
    /// Concatenates, in table order, the channel list of every entry whose
    /// tag equals `tag` or is the wildcard. Duplicates are kept.
    #[must_use]
    pub fn resolve(&self, tag: &str) -> Vec<ChannelId> {
        self.matching(tag)
            .flat_map(|r| r.channels.iter().copied())
            .collect()
    }
}

impl<T, I> FromIterator<(T, I)> for RoutingTable
where
    T: Into<String>,
    I: IntoIterator<Item = ChannelId>,
{
    fn from_iter<It: IntoIterator<Item = (T, I)>>(iter: It) -> Self {
        let mut table = Self::new();
        table.set_all(iter);
        table
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn ids(raw: &[u64]) -> Vec<ChannelId> {
        raw.iter().copied().map(ChannelId::new).collect()
    }

    fn table(entries: &[(&str, &[u64])]) -> RoutingTable {
        entries
            .iter()
            .map(|(tag, raw)| (*tag, ids(raw)))
            .collect()
    }

    #[rstest]
    #[case("")]
    #[case("err")]
    #[case("anything")]
    fn empty_table_resolves_nothing(#[case] tag: &str) {
        assert!(RoutingTable::new().resolve(tag).is_empty());
    }

    #[test]
    fn wildcard_only_matches_anything() {
        let t = table(&[("", &[1, 2])]);
        assert_eq!(t.resolve("anything"), ids(&[1, 2]));
        assert_eq!(t.resolve(""), ids(&[1, 2]));
    }

    #[rstest]
    #[case("err", &[1, 2])]
    #[case("info", &[2])]
    fn exact_then_wildcard(#[case] tag: &str, #[case] expected: &[u64]) {
        let t = table(&[("err", &[1]), ("", &[2])]);
        assert_eq!(t.resolve(tag), ids(expected));
    }

    #[test]
    fn wildcard_first_follows_table_order() {
        let t = table(&[("", &[2]), ("err", &[1])]);
        assert_eq!(t.resolve("err"), ids(&[2, 1]));
    }

    #[test]
    fn no_match_without_wildcard() {
        let t = table(&[("err", &[1]), ("audit", &[3])]);
        assert!(t.resolve("info").is_empty());
    }

    #[test]
    fn duplicates_across_entries_are_kept() {
        let t = table(&[("err", &[5, 6]), ("", &[5])]);
        assert_eq!(t.resolve("err"), ids(&[5, 6, 5]));
    }

    #[test]
    fn resolve_equals_concatenation_of_matching_entries() {
        let t = table(&[("a", &[1]), ("", &[2, 3]), ("b", &[4]), ("c", &[])]);
        for tag in ["a", "b", "c", "", "zzz"] {
            let expected: Vec<ChannelId> = t
                .iter()
                .filter(|r| r.tag == tag || r.tag.is_empty())
                .flat_map(|r| r.channels.clone())
                .collect();
            assert_eq!(t.resolve(tag), expected, "tag {tag:?}");
        }
    }

    #[test]
    fn resolve_does_not_mutate() {
        let t = table(&[("err", &[1]), ("", &[2])]);
        let before = t.clone();
        let _ = t.resolve("err");
        let _ = t.resolve("other");
        assert_eq!(t, before);
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut t = table(&[("err", &[1]), ("", &[2])]);
        let previous = t.insert("err", ids(&[9]));
        assert_eq!(previous, Some(ids(&[1])));
        assert_eq!(t.iter().next().map(|r| r.tag.as_str()), Some("err"));
        assert_eq!(t.resolve("err"), ids(&[9, 2]));

        assert_eq!(t.insert("new", ids(&[3])), None);
        assert_eq!(t.len(), 3);
    }

    #[test]
    fn remove_and_get() {
        let mut t = table(&[("err", &[1]), ("", &[2])]);
        assert_eq!(t.get(WILDCARD), Some(ids(&[2]).as_slice()));
        assert_eq!(t.remove(""), Some(ids(&[2])));
        assert_eq!(t.resolve("info"), Vec::<ChannelId>::new());
        assert_eq!(t.remove("missing"), None);
    }

    #[test]
    fn set_all_replaces_everything() {
        let mut t = table(&[("err", &[1])]);
        t.set_all([("warn", ids(&[4]))]);
        assert_eq!(t.len(), 1);
        assert!(t.get("err").is_none());
        assert_eq!(t.resolve("warn"), ids(&[4]));
    }

    #[test]
    fn from_routes_rejects_duplicates() {
        let routes = vec![
            RouteConfig {
                tag: "err".into(),
                channels: ids(&[1]),
            },
            RouteConfig {
                tag: "err".into(),
                channels: ids(&[2]),
            },
        ];
        let err = RoutingTable::try_from_routes(&routes).unwrap_err();
        assert!(matches!(err, Error::DuplicateTag { index: 1, .. }));

        let ok = RoutingTable::try_from_routes(&routes[..1]).unwrap();
        assert_eq!(ok.resolve("err"), ids(&[1]));
    }

    #[test]
    fn matching_reports_visited_routes() {
        let t = table(&[("err", &[1]), ("warn", &[2]), ("", &[3])]);
        let tags: Vec<&str> = t.matching("err").map(|r| r.tag.as_str()).collect();
        assert_eq!(tags, vec!["err", ""]);
        assert!(t.iter().last().is_some_and(Route::is_wildcard));
    }
}
