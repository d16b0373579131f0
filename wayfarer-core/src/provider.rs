//! Capabilities supplied by the host application.
//!
//! The engine never bundles sample data or presentation rules. Candidate
//! locations come from a [`LocationProvider`] and icons and colours from a
//! [`LocationStyle`], both implemented outside this crate.

use geo::{Intersects, Rect};

use crate::{Category, Location};

/// Source of candidate locations, such as an imported catalog.
///
/// # Examples
/// ```
/// use geo::{Coord, Rect};
/// use wayfarer_core::{Location, LocationProvider};
///
/// struct Fixed(Vec<Location>);
///
/// impl LocationProvider for Fixed {
///     fn locations(&self) -> Box<dyn Iterator<Item = Location> + Send + '_> {
///         Box::new(self.0.iter().cloned())
///     }
/// }
///
/// let provider = Fixed(vec![
///     Location::builder("a", "A", Coord { x: 0.5, y: 0.5 }).build()?,
///     Location::builder("b", "B", Coord { x: 5.0, y: 5.0 }).build()?,
/// ]);
/// let bbox = Rect::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 1.0 });
/// assert_eq!(provider.locations_within(&bbox).count(), 1);
/// # Ok::<(), wayfarer_core::LocationError>(())
/// ```
pub trait LocationProvider: Send + Sync {
    /// Every location the provider knows about.
    fn locations(&self) -> Box<dyn Iterator<Item = Location> + Send + '_>;

    /// Locations inside `bbox`; boundary points count as inside.
    fn locations_within(&self, bbox: &Rect<f64>) -> Box<dyn Iterator<Item = Location> + Send + '_> {
        let bbox = *bbox;
        Box::new(
            self.locations()
                .filter(move |location| bbox.intersects(&location.coord())),
        )
    }
}

/// How the presentation layer draws a category.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StyleHint {
    /// Icon identifier understood by the host.
    pub icon: String,
    /// Colour in a form understood by the host, e.g. `#ff8800`.
    pub color: String,
}

/// Maps categories to icons and colours.
pub trait LocationStyle {
    /// Style for `category`.
    fn style(&self, category: Category) -> StyleHint;

    /// Style for `location`, by its category.
    fn style_for(&self, location: &Location) -> StyleHint {
        self.style(location.category())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MemoryLocations, location};
    use geo::Coord;
    use rstest::rstest;

    struct Monochrome;

    impl LocationStyle for Monochrome {
        fn style(&self, category: Category) -> StyleHint {
            StyleHint {
                icon: category.as_str().to_owned(),
                color: "#000000".to_owned(),
            }
        }
    }

    #[rstest]
    fn bbox_filter_includes_boundary() {
        let provider = MemoryLocations::with_locations([
            location("edge", 1.0, 1.0).build().expect("valid"),
            location("out", 1.5, 1.0).build().expect("valid"),
        ]);
        let bbox = Rect::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 1.0 });
        let ids: Vec<_> = provider
            .locations_within(&bbox)
            .map(|loc| loc.id().to_string())
            .collect();
        assert_eq!(ids, vec!["edge"]);
    }

    #[rstest]
    fn style_for_uses_category() {
        let loc = location("a", 0.0, 0.0)
            .category(Category::Hotel)
            .build()
            .expect("valid");
        assert_eq!(Monochrome.style_for(&loc).icon, "hotel");
    }
}
