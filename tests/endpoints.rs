use crudpath::construct::{Model, Property};
use crudpath::datatype::DataType;
use crudpath::endpoint::{Action, Endpoint, Method, list_segments};
use pretty_assertions::assert_eq;
use serde_json::json;

fn person() -> Model {
    Model::new(
        "person",
        Property::new("id", DataType::integer(i64::MAX)),
        vec![
            Property::new("name", DataType::string(64)),
            Property::new("age", DataType::integer(150)),
        ],
    )
    .unwrap()
    .with_collection("people")
}

#[test]
fn crud_routes() {
    let endpoints = Endpoint::for_model(&person());
    let routes: Vec<(Method, &str)> = endpoints.iter().map(|e| (e.method(), e.path())).collect();
    assert_eq!(
        routes,
        vec![
            (Method::Put, "/person"),
            (Method::Get, "/person/:id"),
            (Method::Patch, "/person/:id"),
            (Method::Delete, "/person/:id"),
            (Method::Get, "/people/:p0?/:p1?/:p2?/:p3?/:p4?/:p5?/:p6?/:p7?/:p8?"),
        ]
    );
    assert_eq!(endpoints[4].action(), Action::List);
    assert_eq!(endpoints[0].to_string(), "PUT    /person (person create)");
}

#[test]
fn segments_of_list_paths() {
    let person = person();
    assert_eq!(list_segments(&person, "/people"), Some(vec![]));
    assert_eq!(list_segments(&person, "/people/"), Some(vec![]));
    assert_eq!(
        list_segments(&person, "/people/age/lessThan/30"),
        Some(vec!["age".to_owned(), "lessThan".to_owned(), "30".to_owned()])
    );
    assert_eq!(
        list_segments(&person, "/people/age/30/?page=2"),
        Some(vec!["age".to_owned(), "30".to_owned()])
    );
}

#[test]
fn foreign_paths_are_rejected() {
    let person = person();
    assert_eq!(list_segments(&person, "/person/age/30"), None);
    assert_eq!(list_segments(&person, "/peoples/age/30"), None);
    assert_eq!(list_segments(&person, "people/age/30"), None);
    assert_eq!(list_segments(&person, "/people//30"), None);
    assert_eq!(list_segments(&person, "/people//"), None);
    assert_eq!(list_segments(&person, "/people/age/30//"), None);
    let too_long = format!("/people{}", "/x".repeat(10));
    assert_eq!(list_segments(&person, &too_long), None);
}

#[test]
fn segments_feed_the_decoder() {
    let person = person();
    let segments = list_segments(&person, "/people/name/startsWith/Al/s/smith").unwrap();
    let result = person.grammar().decode(&segments);
    assert_eq!(
        serde_json::to_value(&result).unwrap()["criteria"],
        json!({ "name": { "startsWith": "Al" }, "s": { "is": "smith" } })
    );
}
