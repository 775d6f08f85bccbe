//! Cases checked through both normalization and denormalization.

mod common;

use apollo_normalized_cache::Configuration;
use apollo_normalized_cache::StaleEntities;
use apollo_normalized_cache::json_ext::Value;
use apollo_normalized_cache::normalize;
use common::SharedTest;
use pretty_assertions::assert_eq;
use serde_json_bytes::json;

const POSTS_QUERY: &str = r#"
    query TestQuery {
      posts {
        id
        __typename
        author {
          id
          __typename
          name
        }
        title
        comments {
          id
          __typename
          commenter {
            id
            __typename
            name
          }
        }
      }
    }
"#;

fn shared_tests() -> Vec<SharedTest> {
    vec![
        SharedTest {
            name: "simple",
            query: POSTS_QUERY,
            variables: json!({}),
            data: json!({
                "posts": [{
                    "id": "123",
                    "__typename": "Post",
                    "author": { "id": "1", "__typename": "Author", "name": "Ada" },
                    "title": "T",
                    "comments": null
                }]
            }),
            norm_map: json!({
                "ROOT_QUERY": { "posts": ["Post;123"] },
                "Post;123": {
                    "id": "123",
                    "__typename": "Post",
                    "author": "Author;1",
                    "title": "T",
                    "comments": null
                },
                "Author;1": { "id": "1", "__typename": "Author", "name": "Ada" }
            }),
        },
        SharedTest {
            name: "with comments",
            query: POSTS_QUERY,
            variables: json!({}),
            data: json!({
                "posts": [{
                    "id": "123",
                    "__typename": "Post",
                    "author": { "id": "1", "__typename": "Author", "name": "Paul" },
                    "title": "My awesome blog post",
                    "comments": [{
                        "id": "324",
                        "__typename": "Comment",
                        "commenter": { "id": "2", "__typename": "Author", "name": "Nicole" }
                    }, {
                        "id": "325",
                        "__typename": "Comment",
                        "commenter": { "id": "1", "__typename": "Author", "name": "Paul" }
                    }]
                }]
            }),
            norm_map: json!({
                "ROOT_QUERY": { "posts": ["Post;123"] },
                "Post;123": {
                    "id": "123",
                    "__typename": "Post",
                    "author": "Author;1",
                    "title": "My awesome blog post",
                    "comments": ["Comment;324", "Comment;325"]
                },
                "Author;1": { "id": "1", "__typename": "Author", "name": "Paul" },
                "Comment;324": { "id": "324", "__typename": "Comment", "commenter": "Author;2" },
                "Author;2": { "id": "2", "__typename": "Author", "name": "Nicole" },
                "Comment;325": { "id": "325", "__typename": "Comment", "commenter": "Author;1" }
            }),
        },
        SharedTest {
            name: "with skip variable true",
            query: r#"
                query TestQuery($noPosts: Boolean!) {
                  posts @skip(if: $noPosts) {
                    id
                    __typename
                    title
                  }
                }
            "#,
            variables: json!({ "noPosts": true }),
            data: json!({}),
            norm_map: json!({ "ROOT_QUERY": {} }),
        },
        SharedTest {
            name: "with include literal false",
            query: r#"
                query TestQuery {
                  posts @include(if: false) {
                    id
                    __typename
                    title
                  }
                }
            "#,
            variables: json!({ "noPosts": true }),
            data: json!({}),
            norm_map: json!({ "ROOT_QUERY": {} }),
        },
        SharedTest {
            name: "with include variable true",
            query: r#"
                query TestQuery($withTitle: Boolean!) {
                  posts {
                    id
                    __typename
                    title @include(if: $withTitle)
                  }
                }
            "#,
            variables: json!({ "withTitle": true }),
            data: json!({ "posts": [{ "id": "1", "__typename": "Post", "title": "T" }] }),
            norm_map: json!({
                "ROOT_QUERY": { "posts": ["Post;1"] },
                "Post;1": { "id": "1", "__typename": "Post", "title": "T" }
            }),
        },
        SharedTest {
            name: "with aliases",
            query: r#"
                query TestQuery {
                  first: post(id: 1) { id __typename heading: title }
                  second: post(id: 2) { id __typename heading: title }
                }
            "#,
            variables: json!({}),
            data: json!({
                "first": { "id": "1", "__typename": "Post", "heading": "One" },
                "second": { "id": "2", "__typename": "Post", "heading": "Two" }
            }),
            norm_map: json!({
                "ROOT_QUERY": { "first": "Post;1", "second": "Post;2" },
                "Post;1": { "id": "1", "__typename": "Post", "heading": "One" },
                "Post;2": { "id": "2", "__typename": "Post", "heading": "Two" }
            }),
        },
        SharedTest {
            name: "with embedded object",
            query: r#"
                query TestQuery {
                  viewer {
                    settings { theme locale }
                    me { id __typename name }
                  }
                }
            "#,
            variables: json!({}),
            data: json!({
                "viewer": {
                    "settings": { "theme": "dark", "locale": "fr" },
                    "me": { "id": "1", "__typename": "Person", "name": "Ada" }
                }
            }),
            norm_map: json!({
                "ROOT_QUERY": {
                    "viewer": {
                        "settings": { "theme": "dark", "locale": "fr" },
                        "me": "Person;1"
                    }
                },
                "Person;1": { "id": "1", "__typename": "Person", "name": "Ada" }
            }),
        },
        SharedTest {
            name: "with fragments",
            query: r#"
                query TestQuery {
                  feed {
                    __typename
                    id
                    ...PostFields
                    ... on Video { duration }
                  }
                }

                fragment PostFields on Post {
                  title
                  author { ...AuthorFields }
                }

                fragment AuthorFields on Author {
                  id
                  __typename
                  name
                }
            "#,
            variables: json!({}),
            data: json!({
                "feed": [
                    {
                        "__typename": "Post",
                        "id": "1",
                        "title": "T",
                        "author": { "id": "9", "__typename": "Author", "name": "Ada" }
                    },
                    { "__typename": "Video", "id": "2", "duration": 30 }
                ]
            }),
            norm_map: json!({
                "ROOT_QUERY": { "feed": ["Post;1", "Video;2"] },
                "Post;1": { "__typename": "Post", "id": "1", "title": "T", "author": "Author;9" },
                "Author;9": { "id": "9", "__typename": "Author", "name": "Ada" },
                "Video;2": { "__typename": "Video", "id": "2", "duration": 30 }
            }),
        },
        SharedTest {
            name: "with overlapping fragment selections",
            query: r#"
                query TestQuery {
                  me { id __typename name }
                  viewer { theme }
                  ...RootExtra
                  ... on Query {
                    viewer { locale }
                  }
                }

                fragment RootExtra on Query {
                  me { id __typename age friends { id __typename name } }
                }
            "#,
            variables: json!({}),
            data: json!({
                "me": {
                    "id": "1",
                    "__typename": "Person",
                    "name": "Ada",
                    "age": 36,
                    "friends": [{ "id": "2", "__typename": "Person", "name": "Grace" }]
                },
                "viewer": { "theme": "dark", "locale": "fr" }
            }),
            norm_map: json!({
                "ROOT_QUERY": {
                    "me": "Person;1",
                    "viewer": { "theme": "dark", "locale": "fr" }
                },
                "Person;1": {
                    "id": "1",
                    "__typename": "Person",
                    "name": "Ada",
                    "age": 36,
                    "friends": ["Person;2"]
                },
                "Person;2": { "id": "2", "__typename": "Person", "name": "Grace" }
            }),
        },
        SharedTest {
            name: "with scalar lists and numbers",
            query: r#"
                query TestQuery {
                  product { id __typename tags ratings price }
                }
            "#,
            variables: json!({}),
            data: json!({
                "product": {
                    "id": 42,
                    "__typename": "Product",
                    "tags": ["new", "sale"],
                    "ratings": [5, 4],
                    "price": 9.5
                }
            }),
            norm_map: json!({
                "ROOT_QUERY": { "product": "Product;42" },
                "Product;42": {
                    "id": 42,
                    "__typename": "Product",
                    "tags": ["new", "sale"],
                    "ratings": [5, 4],
                    "price": 9.5
                }
            }),
        },
    ]
}

#[test]
fn normalize_shared_tests() {
    for test in shared_tests() {
        let normalized = normalize(
            &test.query(),
            &test.variables(),
            test.data.as_object(),
            &Configuration::default(),
        );
        assert_eq!(normalized.to_value(), test.norm_map, "{}", test.name);
    }
}

#[test]
fn denormalize_shared_tests() {
    for test in shared_tests() {
        let result = common::denormalize(
            &test.query(),
            &test.variables(),
            &test.norm_map(),
            &StaleEntities::new(),
        );
        assert!(!result.partial, "{}: unexpected partial result", test.name);
        assert!(!result.stale, "{}: unexpected stale result", test.name);
        assert_eq!(Value::Object(result.data), test.data, "{}", test.name);
    }
}

#[test]
fn round_trip_through_a_merged_cache() {
    // normalizing two responses into the same cache keeps both answerable
    let mut cache = apollo_normalized_cache::NormMap::new();
    for test in shared_tests() {
        let normalized = normalize(
            &test.query(),
            &test.variables(),
            test.data.as_object(),
            &Configuration::default(),
        );
        cache = cache.merge(&normalized);
    }

    let last = shared_tests().pop().unwrap();
    let result = common::denormalize(
        &last.query(),
        &last.variables(),
        &cache,
        &StaleEntities::new(),
    );
    assert!(!result.partial);
    assert_eq!(Value::Object(result.data), last.data);
}

#[test]
fn excluded_fields_never_reach_the_cache() {
    let query = apollo_normalized_cache::Query::parse(
        "query($skip: Boolean!) { me { id __typename secret @skip(if: $skip) } }",
        None,
    )
    .unwrap();
    let variables = common::object(&json!({ "skip": true }));
    let data = json!({ "me": { "id": "1", "__typename": "Person", "secret": "s" } });

    let normalized = normalize(&query, &variables, data.as_object(), &Configuration::default());
    assert_eq!(
        normalized.to_value(),
        json!({
            "ROOT_QUERY": { "me": "Person;1" },
            "Person;1": { "id": "1", "__typename": "Person" }
        })
    );

    let result = common::denormalize(&query, &variables, &normalized, &StaleEntities::new());
    assert!(!result.partial);
    assert_eq!(
        Value::Object(result.data),
        json!({ "me": { "id": "1", "__typename": "Person" } })
    );
}
