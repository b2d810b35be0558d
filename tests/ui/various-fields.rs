use chrono::{DateTime, Utc};
use tablerecord::{RecordKey, TableAttributes, TableRecord};

#[derive(Debug, TableRecord)]
#[table(name = "crazy")]
struct Crazy {
    #[table(key)]
    key: RecordKey,

    a: String,
    b: Option<String>,
    c: i64,
    d: i32,
    e: i16,
    f: u32,
    g: f64,
    h: f32,
    i: bool,
    j: Option<i64>,
    k: DateTime<Utc>,
    l: Option<DateTime<Utc>>,

    #[table(rename = "renamed")]
    m: String,

    #[table(skip)]
    n: Vec<u8>,

    #[table(extra)]
    rest: TableAttributes,
}

fn main() {}
