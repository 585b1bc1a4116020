use rand::Rng;

pub const ISBN_LEN: usize = 13;

/// Thirteen uniformly random decimal digits. No check digit is computed.
pub fn generate_random_isbn() -> String {
    let mut rng = rand::thread_rng();
    (0..ISBN_LEN)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

pub fn is_isbn13_digits(value: &str) -> bool {
    value.len() == ISBN_LEN && value.bytes().all(|b| b.is_ascii_digit())
}
