// src/services/catalog_service.rs

use std::{cmp::Ordering, sync::Arc};

use serde::Deserialize;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::ListingStore,
    models::catalog::{Listing, ListingType},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ListingSort {
    PriceLow,
    PriceHigh,
    Rating,
}

// Filtros da tela de cidade (lista de hotéis / homestays)
#[derive(Debug, Default, Clone)]
pub struct ListingFilter {
    pub city: Option<String>,
    pub kind: Option<ListingType>,
    pub query: Option<String>,
    pub sort: Option<ListingSort>,
}

#[derive(Clone)]
pub struct CatalogService {
    listing_repo: Arc<dyn ListingStore>,
}

impl CatalogService {
    pub fn new(listing_repo: Arc<dyn ListingStore>) -> Self {
        Self { listing_repo }
    }

    pub async fn list_cities(&self) -> Result<Vec<String>, AppError> {
        self.listing_repo.list_cities().await
    }

    pub async fn get_listing(&self, id: Uuid) -> Result<Listing, AppError> {
        self.listing_repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::ListingNotFound)
    }

    pub async fn list_listings(&self, filter: &ListingFilter) -> Result<Vec<Listing>, AppError> {
        let listings = self.listing_repo.list_by_city(filter.city.as_deref()).await?;
        Ok(apply_filter(listings, filter))
    }
}

fn matches_kind(listing: &Listing, kind: ListingType) -> bool {
    match kind {
        ListingType::Homestay => listing.is_homestay(),
        ListingType::Hotel => !listing.is_homestay(),
    }
}

fn matches_query(listing: &Listing, query: &str) -> bool {
    let q = query.to_lowercase();
    listing.hotel_name.to_lowercase().contains(&q)
        || listing
            .address
            .as_deref()
            .is_some_and(|a| a.to_lowercase().contains(&q))
        || listing.amenities.iter().any(|a| a.to_lowercase().contains(&q))
}

// Sem quartos = preço infinito, vai para o fim nas duas direções
fn compare_price(a: &Listing, b: &Listing, ascending: bool) -> Ordering {
    match (a.lowest_price(), b.lowest_price()) {
        (Some(pa), Some(pb)) if ascending => pa.cmp(&pb),
        (Some(pa), Some(pb)) => pb.cmp(&pa),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn compare_rating(a: &Listing, b: &Listing) -> Ordering {
    match (a.rating, b.rating) {
        (Some(ra), Some(rb)) => rb.partial_cmp(&ra).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn apply_filter(listings: Vec<Listing>, filter: &ListingFilter) -> Vec<Listing> {
    let query = filter.query.as_deref().map(str::trim).filter(|q| !q.is_empty());

    let mut result: Vec<Listing> = listings
        .into_iter()
        .filter(|l| filter.kind.is_none_or(|k| matches_kind(l, k)))
        .filter(|l| query.is_none_or(|q| matches_query(l, q)))
        .collect();

    // sort_by é estável: empates mantêm a ordem do banco
    match filter.sort {
        Some(ListingSort::PriceLow) => result.sort_by(|a, b| compare_price(a, b, true)),
        Some(ListingSort::PriceHigh) => result.sort_by(|a, b| compare_price(a, b, false)),
        Some(ListingSort::Rating) => result.sort_by(compare_rating),
        None => {}
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db::memory::MemoryStore, models::catalog::Room};

    fn listing(city: &str, name: &str, kind: ListingType, price: Option<i64>, rating: Option<f64>) -> Listing {
        Listing {
            id: Uuid::new_v4(),
            city: city.into(),
            hotel_name: name.into(),
            address: Some(format!("{} center", city)),
            kind,
            amenities: vec!["Wifi".into(), "Hồ bơi".into()],
            rating,
            main_image: None,
            sub_images: vec![],
            owner_id: None,
            rooms: price
                .map(|p| vec![Room { room_type: "Standard".into(), price: p, available: 3 }])
                .unwrap_or_default(),
        }
    }

    fn catalog() -> CatalogService {
        CatalogService::new(Arc::new(MemoryStore::with_listings(vec![
            listing("Đà Nẵng", "Muong Thanh", ListingType::Hotel, Some(1_200_000), Some(4.2)),
            listing("Đà Nẵng", "Nhà nghỉ An Bình", ListingType::Hotel, Some(300_000), None),
            listing("Hà Nội", "Old Quarter Homestay", ListingType::Homestay, Some(450_000), Some(4.8)),
            listing("Đà Nẵng", "Sea View", ListingType::Hotel, None, Some(4.9)),
        ])))
    }

    #[tokio::test]
    async fn cities_are_distinct_in_first_seen_order() {
        let cities = catalog().list_cities().await.unwrap();
        assert_eq!(cities, vec!["Đà Nẵng".to_string(), "Hà Nội".to_string()]);
    }

    #[tokio::test]
    async fn kind_filter_uses_name_hints() {
        let filter = ListingFilter {
            city: Some("Đà Nẵng".into()),
            kind: Some(ListingType::Homestay),
            ..Default::default()
        };
        let homestays = catalog().list_listings(&filter).await.unwrap();
        assert_eq!(homestays.len(), 1);
        assert_eq!(homestays[0].hotel_name, "Nhà nghỉ An Bình");

        let hotels = catalog()
            .list_listings(&ListingFilter { kind: Some(ListingType::Hotel), ..filter })
            .await
            .unwrap();
        assert_eq!(hotels.len(), 2);
    }

    #[tokio::test]
    async fn query_matches_amenities_case_insensitively() {
        let filter = ListingFilter {
            query: Some("WIFI".into()),
            ..Default::default()
        };
        assert_eq!(catalog().list_listings(&filter).await.unwrap().len(), 4);

        let filter = ListingFilter {
            query: Some("muong".into()),
            ..Default::default()
        };
        assert_eq!(catalog().list_listings(&filter).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn price_sort_puts_roomless_listings_last() {
        let filter = ListingFilter {
            city: Some("Đà Nẵng".into()),
            sort: Some(ListingSort::PriceLow),
            ..Default::default()
        };
        let names: Vec<String> = catalog()
            .list_listings(&filter)
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.hotel_name)
            .collect();
        assert_eq!(names, vec!["Nhà nghỉ An Bình", "Muong Thanh", "Sea View"]);

        let filter = ListingFilter { sort: Some(ListingSort::PriceHigh), ..filter };
        let first = catalog().list_listings(&filter).await.unwrap().remove(0);
        assert_eq!(first.hotel_name, "Muong Thanh");
    }

    #[tokio::test]
    async fn rating_sort_is_descending_with_unrated_last() {
        let filter = ListingFilter {
            sort: Some(ListingSort::Rating),
            ..Default::default()
        };
        let names: Vec<String> = catalog()
            .list_listings(&filter)
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.hotel_name)
            .collect();
        assert_eq!(names.first().map(String::as_str), Some("Sea View"));
        assert_eq!(names.last().map(String::as_str), Some("Nhà nghỉ An Bình"));
    }

    #[tokio::test]
    async fn unknown_listing_is_not_found() {
        let err = catalog().get_listing(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::ListingNotFound));
    }
}
