use deep_copy::DeepCopy;

#[derive(DeepCopy)]
#[deep_copy(immutable, shallow)]
struct Bad {
    value: i32,
}

fn main() {}
