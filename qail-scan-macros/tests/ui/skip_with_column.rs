use qail_scan::Record;

#[derive(Default, Record)]
struct Item {
    #[scan(skip, column = "id")]
    id: i64,
}

fn main() {}
