//! Static list of Top Stories sections

/// A content category served by the Top Stories API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Arts,
    Automobiles,
    Books,
    Business,
    Fashion,
    Food,
    Health,
    Home,
    Insider,
    Magazine,
    Movies,
    NyRegion,
    Obituaries,
    Opinion,
    Politics,
    RealEstate,
    Science,
    Sports,
    SundayReview,
    Technology,
    Theater,
    TMagazine,
    Travel,
    Upshot,
    Us,
    World,
}

/// Every section, in menu order
static SECTIONS: [Section; 26] = [
    Section::Home,
    Section::World,
    Section::Us,
    Section::Politics,
    Section::NyRegion,
    Section::Business,
    Section::Technology,
    Section::Science,
    Section::Health,
    Section::Sports,
    Section::Arts,
    Section::Books,
    Section::Movies,
    Section::Theater,
    Section::Fashion,
    Section::Food,
    Section::Travel,
    Section::Magazine,
    Section::TMagazine,
    Section::RealEstate,
    Section::Automobiles,
    Section::Obituaries,
    Section::Opinion,
    Section::SundayReview,
    Section::Insider,
    Section::Upshot,
];

impl Section {
    /// Returns a slice containing all sections in menu order.
    pub fn all() -> &'static [Section] {
        &SECTIONS
    }

    /// Returns the lowercase identifier used in endpoint paths and store keys.
    pub fn id(&self) -> &'static str {
        match self {
            Section::Arts => "arts",
            Section::Automobiles => "automobiles",
            Section::Books => "books",
            Section::Business => "business",
            Section::Fashion => "fashion",
            Section::Food => "food",
            Section::Health => "health",
            Section::Home => "home",
            Section::Insider => "insider",
            Section::Magazine => "magazine",
            Section::Movies => "movies",
            Section::NyRegion => "nyregion",
            Section::Obituaries => "obituaries",
            Section::Opinion => "opinion",
            Section::Politics => "politics",
            Section::RealEstate => "realestate",
            Section::Science => "science",
            Section::Sports => "sports",
            Section::SundayReview => "sundayreview",
            Section::Technology => "technology",
            Section::Theater => "theater",
            Section::TMagazine => "t-magazine",
            Section::Travel => "travel",
            Section::Upshot => "upshot",
            Section::Us => "us",
            Section::World => "world",
        }
    }

    /// Returns a human-readable display label for the section.
    pub fn label(&self) -> &'static str {
        match self {
            Section::Arts => "Arts",
            Section::Automobiles => "Automobiles",
            Section::Books => "Books",
            Section::Business => "Business",
            Section::Fashion => "Fashion",
            Section::Food => "Food",
            Section::Health => "Health",
            Section::Home => "Home",
            Section::Insider => "Insider",
            Section::Magazine => "Magazine",
            Section::Movies => "Movies",
            Section::NyRegion => "N.Y. Region",
            Section::Obituaries => "Obituaries",
            Section::Opinion => "Opinion",
            Section::Politics => "Politics",
            Section::RealEstate => "Real Estate",
            Section::Science => "Science",
            Section::Sports => "Sports",
            Section::SundayReview => "Sunday Review",
            Section::Technology => "Technology",
            Section::Theater => "Theater",
            Section::TMagazine => "T Magazine",
            Section::Travel => "Travel",
            Section::Upshot => "The Upshot",
            Section::Us => "U.S.",
            Section::World => "World",
        }
    }

    /// Parses user input into a Section.
    ///
    /// Matching is case-insensitive against both the identifier and the
    /// display label, e.g. "World", "NYREGION" or "n.y. region".
    ///
    /// Returns `None` if the input doesn't match any section.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Section> {
        let wanted = s.trim().to_lowercase();
        Section::all()
            .iter()
            .copied()
            .find(|section| section.id() == wanted || section.label().to_lowercase() == wanted)
    }
}
