//! The built-in catalogue shipped with the application.
//!
//! These five locations around the Łódź University of Technology campus are
//! always present; approved remote locations are merged on top of them.

use crate::location::{
  Category, Coordinates, DietaryTag, Location, MealTime, PriceRange,
};

/// Centre of the campus map.
pub const CAMPUS_CENTRE: Coordinates = Coordinates {
  lat: 51.7472620296469,
  lng: 19.453302755355534,
};

#[allow(clippy::too_many_arguments)]
fn location(
  id: u64,
  name: &str,
  category: Category,
  price_range: PriceRange,
  dietary: &[DietaryTag],
  meal_times: &[MealTime],
  description: &str,
  address: &str,
  rating: f64,
  discount: &str,
  nutrition_highlights: &[&str],
  top_dish: &str,
  (lat, lng): (f64, f64),
) -> Location {
  Location {
    id,
    name: name.to_owned(),
    address: address.to_owned(),
    category,
    price_range,
    dietary: dietary.to_vec(),
    meal_times: meal_times.to_vec(),
    description: description.to_owned(),
    rating,
    discount: Some(discount.to_owned()),
    top_dish: top_dish.to_owned(),
    coordinates: Some(Coordinates { lat, lng }),
    nutrition_highlights: nutrition_highlights
      .iter()
      .map(|s| (*s).to_owned())
      .collect(),
    image_url: None,
  }
}

/// The fixed sample locations, in display order.
pub fn sample_locations() -> Vec<Location> {
  use DietaryTag::*;
  use MealTime::*;

  vec![
    location(
      1,
      "Restauracja Politechnika",
      Category::Campus,
      PriceRange::Low,
      &[Vegetarian, Vegan, GlutenFree],
      &[Breakfast, Lunch, Dinner],
      "Main campus cafeteria with daily specials and budget-friendly options.",
      "Aleje Politechniki 8, Building B9",
      4.2,
      "20% off with student ID",
      &["High protein options", "Fresh salads daily"],
      "Vegetable Curry - 8 PLN",
      (51.74717066396719, 19.453707281086025),
    ),
    location(
      2,
      "GIÀ pasta bar",
      Category::Local,
      PriceRange::Medium,
      &[Vegetarian, Vegan],
      &[Lunch, Dinner],
      "Vegetarian and vegan cafe with fresh juices and smoothies.",
      "Aleje Politechniki 1 (Nowa Sukcesja), 5 min from campus",
      4.7,
      "Free drink with meal purchase",
      &["Organic ingredients", "No added sugars"],
      "Buddha Bowl - 15 PLN",
      (51.749699474686125, 19.449647520572903),
    ),
    location(
      3,
      "Bar Ha Long",
      Category::Local,
      PriceRange::Low,
      &[Halal],
      &[Breakfast, Lunch],
      "Quick and affordable snacks and light meals near Campus A.",
      "Radwanska Str 30",
      3.9,
      "10% off during exam weeks",
      &["Whole grain options", "Fresh fruit available"],
      "Indian Chicken - 10 PLN",
      (51.752068082781435, 19.451446114697674),
    ),
    location(
      4,
      "Serenissima Poland Sp. o.o.",
      Category::Campus,
      PriceRange::Medium,
      &[Vegetarian, GlutenFree],
      &[Lunch, Dinner],
      "Popular student hangout with comfort food and study-friendly environment.",
      "Aleje Politechniki 3a, Building C15",
      4.0,
      "Student loyalty card: buy 9 meals, get 1 free",
      &["Balanced meals", "Local ingredients"],
      "Quinoa Bowl - 12 PLN",
      (51.749031438753164, 19.449498397401925),
    ),
    location(
      5,
      "Zatoka Smaku",
      Category::Campus,
      PriceRange::Low,
      &[Halal, Vegetarian],
      &[Breakfast, Lunch, Dinner],
      "Fast-casual spot with diverse options under 10 PLN.",
      "Zatoka Sportu Politechniki Łódzkiej, Floor 1",
      3.7,
      "Breakfast special: 5 PLN before 10am",
      &["Portion control options", "Low-sodium selections"],
      "Falafel Sandwich - 9 PLN",
      (51.74623336992477, 19.45187898413258),
    ),
  ]
}
