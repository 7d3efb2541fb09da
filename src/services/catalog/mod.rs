//! Static content catalog and the genre-driven discover sections.
//!
//! The catalog splits into featured items (anticipated releases shown in the
//! carousel) and general items. Discover shows three sections, one per
//! preferred genre, each filled from the general items. A genre that matches
//! too few titles falls back to a fixed positional slice so no section
//! renders empty.

use serde::Serialize;

use crate::{
    error::{AppError, AppResult},
    models::ContentItem,
};

mod data;

/// Genres used when the user has not chosen enough of their own
pub const DEFAULT_GENRES: [&str; SECTION_COUNT] = ["Romance", "Fantasy", "Thriller"];
pub const SECTION_COUNT: usize = 3;
/// Items revealed initially and on every "load more"
pub const PAGE_SIZE: usize = 4;
/// A genre must match at least this many titles to fill its own section
pub const MIN_SECTION_MATCHES: usize = 4;

#[derive(Debug, Clone)]
pub struct Catalog {
    items: Vec<ContentItem>,
}

/// One discover row
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DiscoverSection {
    pub title: String,
    pub genre: String,
    /// Filled from the positional slice instead of genre matches
    pub fallback: bool,
    pub items: Vec<ContentItem>,
}

/// A revealed prefix of one section
#[derive(Debug, Clone, Serialize)]
pub struct SectionPage {
    pub index: usize,
    pub title: String,
    pub genre: String,
    pub fallback: bool,
    pub items: Vec<ContentItem>,
    pub revealed: usize,
    pub total: usize,
    pub has_more: bool,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::sample()
    }
}

impl Catalog {
    pub fn new(items: Vec<ContentItem>) -> Self {
        Self { items }
    }

    /// The bundled catalog
    pub fn sample() -> Self {
        Self::new(data::sample_items())
    }

    pub fn items(&self) -> &[ContentItem] {
        &self.items
    }

    /// Anticipated releases, in catalog order
    pub fn featured(&self) -> Vec<&ContentItem> {
        self.items.iter().filter(|i| i.anticipated_release).collect()
    }

    /// Everything that is not featured, in catalog order
    pub fn general(&self) -> Vec<&ContentItem> {
        self.items.iter().filter(|i| !i.anticipated_release).collect()
    }

    pub fn find(&self, id: &str) -> Option<&ContentItem> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Builds the three discover sections from the user's preferred genres
    pub fn discover_sections(&self, preferred: &[String]) -> [DiscoverSection; SECTION_COUNT] {
        let general = self.general();
        std::array::from_fn(|index| build_section(&general, preferred, index))
    }

    /// One section, paged to `revealed` items plus one more page
    pub fn section_page(
        &self,
        preferred: &[String],
        index: usize,
        revealed: usize,
    ) -> AppResult<SectionPage> {
        if index >= SECTION_COUNT {
            return Err(AppError::NotFound(format!("Section {} does not exist", index)));
        }

        let section = build_section(&self.general(), preferred, index);
        let mut pager = SectionPager::resume(section.items.len(), revealed);
        if revealed > 0 {
            pager.load_more();
        }

        Ok(SectionPage {
            index,
            items: pager.visible(&section.items).to_vec(),
            revealed: pager.revealed(),
            total: section.items.len(),
            has_more: pager.has_more(),
            title: section.title,
            genre: section.genre,
            fallback: section.fallback,
        })
    }
}

fn target_genre(preferred: &[String], index: usize) -> String {
    preferred
        .get(index)
        .map(|g| g.trim())
        .filter(|g| !g.is_empty())
        .unwrap_or(DEFAULT_GENRES[index])
        .to_string()
}

fn section_title(index: usize, genre: &str) -> String {
    match index {
        0 => format!("Picks for You: {}", genre),
        1 => format!("Explore {} Content", genre),
        _ => format!("Binge-Worthy {}", genre),
    }
}

/// Positional slice `[4i, 4i+4)`, wrapping around when the catalog is too short
fn fallback_items(general: &[&ContentItem], index: usize) -> Vec<ContentItem> {
    let n = general.len();
    if n == 0 {
        return Vec::new();
    }

    let start = (index * PAGE_SIZE).min(n);
    let end = (start + PAGE_SIZE).min(n);
    if start < end {
        return general[start..end].iter().map(|i| (*i).clone()).collect();
    }

    (0..PAGE_SIZE.min(n))
        .map(|k| general[(index * PAGE_SIZE + k) % n].clone())
        .collect()
}

fn build_section(general: &[&ContentItem], preferred: &[String], index: usize) -> DiscoverSection {
    let genre = target_genre(preferred, index);
    let matches: Vec<ContentItem> = general
        .iter()
        .filter(|i| i.matches_genre(&genre))
        .map(|i| (*i).clone())
        .collect();

    let fallback = matches.len() < MIN_SECTION_MATCHES;
    let items = if fallback {
        tracing::debug!(
            genre = %genre,
            matches = matches.len(),
            section = index,
            "Too few genre matches, using fallback slice"
        );
        fallback_items(general, index)
    } else {
        matches
    };

    DiscoverSection {
        title: section_title(index, &genre),
        genre,
        fallback,
        items,
    }
}

/// Reveal counter for one section; grows by a page at a time, never shrinks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionPager {
    revealed: usize,
    len: usize,
}

impl SectionPager {
    pub fn new(len: usize) -> Self {
        Self {
            revealed: PAGE_SIZE.min(len),
            len,
        }
    }

    /// Restores a pager that had already revealed `revealed` items
    pub fn resume(len: usize, revealed: usize) -> Self {
        let mut pager = Self::new(len);
        pager.revealed = revealed.clamp(pager.revealed, len);
        pager
    }

    pub fn load_more(&mut self) -> usize {
        self.revealed = (self.revealed + PAGE_SIZE).min(self.len);
        self.revealed
    }

    pub fn revealed(&self) -> usize {
        self.revealed
    }

    pub fn has_more(&self) -> bool {
        self.revealed < self.len
    }

    pub fn visible<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[..self.revealed.min(items.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(section: &DiscoverSection) -> Vec<&str> {
        section.items.iter().map(|i| i.id.as_str()).collect()
    }

    fn genres(list: &[&str]) -> Vec<String> {
        list.iter().map(|g| g.to_string()).collect()
    }

    fn plain(id: usize, genre: &str) -> ContentItem {
        ContentItem {
            id: id.to_string(),
            title: format!("Title {}", id),
            genre: genre.to_string(),
            cast: String::new(),
            rating: "7.0".to_string(),
            platform: "Netflix".to_string(),
            image: String::new(),
            description: String::new(),
            anticipated_release: false,
        }
    }

    #[test]
    fn test_sample_catalog_partition() {
        let catalog = Catalog::sample();
        assert_eq!(catalog.general().len(), 12);

        let featured: Vec<&str> = catalog.featured().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(featured, vec!["201", "202", "203", "204", "205"]);
        assert_eq!(catalog.find("8").unwrap().title, "Squid Game");
        assert!(catalog.find("999").is_none());
    }

    #[test]
    fn test_romance_falls_back_to_first_slice() {
        let catalog = Catalog::sample();
        let sections = catalog.discover_sections(&genres(&["Romance"]));

        // Only "1" and "11" mention Romance
        assert!(sections[0].fallback);
        assert_eq!(ids(&sections[0]), vec!["1", "2", "3", "4"]);
        assert_eq!(sections[0].title, "Picks for You: Romance");

        assert_eq!(sections[1].genre, "Fantasy");
        assert_eq!(ids(&sections[1]), vec!["5", "6", "7", "8"]);
        assert_eq!(sections[1].title, "Explore Fantasy Content");

        assert_eq!(sections[2].genre, "Thriller");
        assert_eq!(ids(&sections[2]), vec!["9", "10", "11", "12"]);
        assert_eq!(sections[2].title, "Binge-Worthy Thriller");
    }

    #[test]
    fn test_genre_match_is_case_insensitive_substring() {
        let items = (1..=6)
            .map(|id| plain(id, if id % 2 == 0 { "Crime, THRILLER" } else { "Comedy" }))
            .chain((7..=8).map(|id| plain(id, "psychological thriller")))
            .collect();
        let catalog = Catalog::new(items);

        let sections = catalog.discover_sections(&genres(&["thriller"]));
        assert!(!sections[0].fallback);
        assert_eq!(ids(&sections[0]), vec!["2", "4", "6", "7", "8"]);
    }

    #[test]
    fn test_extra_and_blank_preferences() {
        let catalog = Catalog::sample();
        let sections =
            catalog.discover_sections(&genres(&["  ", "Family", "Comedy", "Horror", "Legal"]));

        assert_eq!(sections[0].genre, "Romance");
        assert_eq!(sections[1].genre, "Family");
        assert_eq!(sections[2].genre, "Comedy");
    }

    #[test]
    fn test_sections_never_empty_for_short_catalogs() {
        for n in 1..=13 {
            let catalog = Catalog::new((1..=n).map(|id| plain(id, "Drama")).collect());
            for preferred in [vec![], genres(&["Sci-Fi"]), genres(&["Drama", "Noir", "Opera"])] {
                for section in catalog.discover_sections(&preferred) {
                    assert!(!section.items.is_empty(), "n={} genre={}", n, section.genre);
                    assert!(section.items.len() <= n.max(PAGE_SIZE));
                }
            }
        }
    }

    #[test]
    fn test_short_catalog_wraps_fallback() {
        let catalog = Catalog::new((1..=5).map(|id| plain(id, "Drama")).collect());
        let sections = catalog.discover_sections(&[]);

        assert_eq!(ids(&sections[0]), vec!["1", "2", "3", "4"]);
        assert_eq!(ids(&sections[1]), vec!["5"]);
        // 8 mod 5 = 3
        assert_eq!(ids(&sections[2]), vec!["4", "5", "1", "2"]);
    }

    #[test]
    fn test_empty_catalog_has_empty_sections() {
        let catalog = Catalog::new(Vec::new());
        assert!(catalog
            .discover_sections(&[])
            .iter()
            .all(|s| s.items.is_empty()));
    }

    #[test]
    fn test_pager_growth() {
        let mut pager = SectionPager::new(10);
        assert_eq!(pager.revealed(), 4);
        assert_eq!(pager.load_more(), 8);
        assert_eq!(pager.load_more(), 10);
        assert_eq!(pager.load_more(), 10);
        assert!(!pager.has_more());

        let short = SectionPager::new(2);
        assert_eq!(short.revealed(), 2);
    }

    #[test]
    fn test_pager_never_exceeds_len_or_shrinks() {
        for len in 0..20 {
            let mut pager = SectionPager::new(len);
            let mut previous = pager.revealed();
            for _ in 0..8 {
                let now = pager.load_more();
                assert!(now <= len);
                assert!(now >= previous);
                previous = now;
            }
        }
    }

    #[test]
    fn test_pager_resume_clamps() {
        assert_eq!(SectionPager::resume(10, 0).revealed(), 4);
        assert_eq!(SectionPager::resume(10, 6).revealed(), 6);
        assert_eq!(SectionPager::resume(10, 50).revealed(), 10);
    }

    #[test]
    fn test_section_page_loads_next_page() {
        let items = (1..=10).map(|id| plain(id, "Drama")).collect();
        let catalog = Catalog::new(items);
        let preferred = genres(&["Drama"]);

        let first = catalog.section_page(&preferred, 0, 0).unwrap();
        assert_eq!(first.items.len(), 4);
        assert!(first.has_more);

        let next = catalog.section_page(&preferred, 0, first.revealed).unwrap();
        assert_eq!(next.revealed, 8);
        assert_eq!(next.total, 10);

        assert!(matches!(
            catalog.section_page(&preferred, 3, 0),
            Err(AppError::NotFound(_))
        ));
    }
}
