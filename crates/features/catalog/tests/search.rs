use sapp_catalog::{Catalog, CatalogError, Facets, SearchQuery, init};
use sapp_kernel::domain::config::CatalogConfig;
use sapp_kernel::domain::model::Money;
use std::io::Write;
use tempfile::NamedTempFile;

const SEED: &str = r#"{
  "products": [
    { "id": "iphone-15", "title": "iPhone 15 Pro Max", "price": "1199.99",
      "category": "Electronics", "subcategory": "Smartphones", "brand": "Apple",
      "rating": 4.8, "tags": ["smartphone", "ios", "flagship"] },
    { "id": "galaxy-s24", "title": "Galaxy S24 Ultra", "price": "1299.99",
      "category": "Electronics", "subcategory": "Smartphones", "brand": "Samsung",
      "rating": 4.7, "tags": ["smartphone", "android"] },
    { "id": "airpods", "title": "AirPods Pro", "price": "249.00",
      "category": "Electronics", "subcategory": "Audio", "brand": "Apple",
      "rating": 4.6, "in_stock": false },
    { "id": "runner", "title": "Ultraboost Running Shoes", "price": 180,
      "category": "Sports", "brand": "Adidas", "rating": 4.4,
      "description": "Responsive running shoe" },
    { "id": "kettle", "title": "Electric Kettle", "price": "39.90",
      "category": "Home", "brand": "Philips" }
  ]
}"#;

fn seed_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(SEED.as_bytes()).expect("write seed");
    file
}

fn catalog() -> Catalog {
    Catalog::from_json(SEED).expect("seed parses")
}

fn ids(hits: &[&sapp_kernel::domain::model::Item]) -> Vec<String> {
    hits.iter().map(|item| item.id.to_string()).collect()
}

#[test]
fn load_reads_seed_file_in_order() {
    let file = seed_file();
    let catalog = Catalog::load(file.path()).expect("load");

    let order: Vec<_> = catalog.items().map(|item| item.id.to_string()).collect();
    assert_eq!(order, ["iphone-15", "galaxy-s24", "airpods", "runner", "kettle"]);
    assert_eq!(catalog.get("runner").map(|item| item.price), Some(Money::from_minor(18_000)));
}

#[test]
fn missing_seed_file_is_an_io_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = Catalog::load(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, CatalogError::Io { .. }));
    assert!(err.to_string().contains("absent.json"));
}

#[test]
fn init_without_seed_yields_empty_catalog_slice() {
    let slice = init(&CatalogConfig::default()).expect("init");
    let catalog = slice.downcast_ref::<Catalog>().expect("catalog slice");
    assert!(catalog.is_empty());
}

#[test]
fn init_with_seed_registers_catalog() {
    let file = seed_file();
    let slice = init(&CatalogConfig { seed: Some(file.path().to_path_buf()) }).expect("init");
    assert!(slice.is::<Catalog>());
    assert_eq!(slice.downcast_ref::<Catalog>().map(Catalog::len), Some(5));
}

#[test]
fn text_search_spans_title_brand_and_tags() {
    let catalog = catalog();

    let hits = catalog.search(&SearchQuery::text("smartphone")).unwrap();
    assert_eq!(ids(&hits), ["iphone-15", "galaxy-s24"]);

    let hits = catalog.search(&SearchQuery::text("apple")).unwrap();
    assert_eq!(ids(&hits), ["iphone-15"], "sold-out AirPods are hidden by default");

    let hits = catalog.search(&SearchQuery::text("running shoe")).unwrap();
    assert_eq!(ids(&hits), ["runner"]);
}

#[test]
fn filters_combine() {
    let catalog = catalog();

    let query = SearchQuery::all()
        .category("ELECTRONICS")
        .include_out_of_stock()
        .price_between(None, Some(Money::from_minor(120_000)));
    assert_eq!(ids(&catalog.search(&query).unwrap()), ["iphone-15", "airpods"]);

    let query = SearchQuery::all().min_rating(4.5);
    assert_eq!(ids(&catalog.search(&query).unwrap()), ["iphone-15", "galaxy-s24"]);

    let query = SearchQuery::all().brand("philips");
    assert_eq!(ids(&catalog.search(&query).unwrap()), ["kettle"]);
}

#[test]
fn limit_truncates_in_catalog_order() {
    let catalog = catalog();
    let hits = catalog.search(&SearchQuery::all().limit(2)).unwrap();
    assert_eq!(ids(&hits), ["iphone-15", "galaxy-s24"]);
}

#[test]
fn invalid_query_is_reported() {
    let catalog = catalog();
    let err = catalog.search(&SearchQuery::all().limit(0)).unwrap_err();
    assert!(matches!(err, CatalogError::InvalidQuery { .. }));
}

#[test]
fn facets_are_sorted_and_distinct() {
    let catalog = catalog();
    assert_eq!(
        catalog.categories().into_iter().collect::<Vec<_>>(),
        ["Electronics", "Home", "Sports"]
    );
    assert_eq!(
        catalog.brands().into_iter().collect::<Vec<_>>(),
        ["Adidas", "Apple", "Philips", "Samsung"]
    );
}

#[test]
fn similar_items_share_subcategory_first() {
    let catalog = catalog();
    assert_eq!(ids(&catalog.similar("iphone-15", 2)), ["galaxy-s24", "airpods"]);
    assert!(catalog.similar("kettle", 2).is_empty());
}

#[test]
fn facets_summarize_search_hits() {
    let catalog = catalog();
    let hits = catalog.search(&SearchQuery::text("smartphone")).unwrap();
    let facets = Facets::from_hits(hits.iter().copied());

    assert_eq!(facets.categories.iter().copied().collect::<Vec<_>>(), ["Electronics"]);
    assert_eq!(facets.brands.iter().copied().collect::<Vec<_>>(), ["Apple", "Samsung"]);

    let bands = facets.price_bands.expect("bands");
    assert_eq!(bands.low.to_string(), "1229.99");
    assert_eq!(bands.high.to_string(), "1269.99");
}
