//! Client-side filtering over a retrieved listing collection.
//!
//! Every filter is an independent predicate, so any composition order keeps the
//! same set of listings. All functions are lazy and borrow their input.

use crate::models::Listing;

/// Category value that disables category filtering
pub const ALL_CATEGORIES: &str = "All";

/// Number of listings shown as featured on the landing page
pub const FEATURED_COUNT: usize = 3;

/// Only "All" and "all" are the identity filter, any other casing is an ordinary category
pub fn matches_category(listing: &Listing, category: &str) -> bool {
    category == ALL_CATEGORIES || category == "all" || listing.category == category
}

pub fn matches_search(listing: &Listing, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    term.is_empty()
        || listing.name.to_lowercase().contains(&term)
        || listing.city.to_lowercase().contains(&term)
}

/// `"All"`/`"all"` passes everything through; anything else is an exact match
pub fn by_category<'a, I>(listings: I, category: &'a str) -> impl Iterator<Item = &'a Listing> + 'a
where
    I: IntoIterator<Item = &'a Listing>,
    I::IntoIter: 'a,
{
    listings
        .into_iter()
        .filter(move |listing| matches_category(listing, category))
}

/// Keep listings priced at or below `ceiling`
pub fn by_max_price<'a, I>(listings: I, ceiling: f64) -> impl Iterator<Item = &'a Listing> + 'a
where
    I: IntoIterator<Item = &'a Listing>,
    I::IntoIter: 'a,
{
    listings
        .into_iter()
        .filter(move |listing| listing.price <= ceiling)
}

/// Keep listings priced within `min..=max`
pub fn by_price_range<'a, I>(listings: I, min: f64, max: f64) -> impl Iterator<Item = &'a Listing> + 'a
where
    I: IntoIterator<Item = &'a Listing>,
    I::IntoIter: 'a,
{
    listings
        .into_iter()
        .filter(move |listing| listing.price >= min && listing.price <= max)
}

/// Case-insensitive substring match on name or city; a blank term passes everything
pub fn by_search_term<'a, I>(listings: I, term: &'a str) -> impl Iterator<Item = &'a Listing> + 'a
where
    I: IntoIterator<Item = &'a Listing>,
    I::IntoIter: 'a,
{
    listings
        .into_iter()
        .filter(move |listing| matches_search(listing, term))
}

pub fn by_availability<'a, I>(listings: I) -> impl Iterator<Item = &'a Listing> + 'a
where
    I: IntoIterator<Item = &'a Listing>,
    I::IntoIter: 'a,
{
    listings.into_iter().filter(|listing| listing.availability)
}

/// First `n` listings in store order
pub fn featured<'a, I>(listings: I, n: usize) -> impl Iterator<Item = &'a Listing> + 'a
where
    I: IntoIterator<Item = &'a Listing>,
    I::IntoIter: 'a,
{
    listings.into_iter().take(n)
}

/// Unique, non-empty categories in the order they first appear
pub fn distinct_categories<'a, I>(listings: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a Listing>,
{
    let mut seen = Vec::<String>::new();
    for listing in listings {
        if !listing.category.is_empty() && !seen.contains(&listing.category) {
            seen.push(listing.category.clone());
        }
    }
    seen
}

/// All browse criteria at once. The default matches every listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingFilter {
    pub available_only: bool,
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub search: Option<String>,
}

impl ListingFilter {
    /// What a traveler browsing the catalog sees before picking anything
    pub fn browse() -> Self {
        Self {
            available_only: true,
            ..Self::default()
        }
    }

    pub fn matches(&self, listing: &Listing) -> bool {
        (!self.available_only || listing.availability)
            && self
                .category
                .as_deref()
                .map_or(true, |category| matches_category(listing, category))
            && self.min_price.map_or(true, |min| listing.price >= min)
            && self.max_price.map_or(true, |max| listing.price <= max)
            && self
                .search
                .as_deref()
                .map_or(true, |term| matches_search(listing, term))
    }

    pub fn apply(&self, listings: Vec<Listing>) -> Vec<Listing> {
        listings.into_iter().filter(|l| self.matches(l)).collect()
    }
}
