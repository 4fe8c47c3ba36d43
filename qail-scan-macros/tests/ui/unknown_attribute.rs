use qail_scan::Record;

#[derive(Default, Record)]
struct Item {
    #[scan(colum = "id")]
    id: i64,
}

fn main() {}
