use qail_scan::Record;

#[derive(Default, Record)]
struct Wrapper<T> {
    inner: T,
}

fn main() {}
