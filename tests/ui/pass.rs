use tablerecord::{RecordKey, TableRecord};

#[derive(Debug, TableRecord)]
#[table(name = "users", partition = "user")]
struct User {
    #[table(key)]
    key: RecordKey,
    email: String,
    name: String,
}

fn main() {}
