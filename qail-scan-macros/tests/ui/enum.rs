use qail_scan::Record;

#[derive(Record)]
enum Status {
    Active,
    Blocked,
}

fn main() {}
