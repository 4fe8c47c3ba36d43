use qail_scan::Record;

#[derive(Default, Record)]
struct Pair(i64, String);

fn main() {}
