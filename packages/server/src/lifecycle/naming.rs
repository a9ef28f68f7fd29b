use rand::Rng;
use rand::distr::Alphanumeric;

/// Length of server-generated image names.
pub const GENERATED_NAME_LEN: usize = 5;

/// Random alphanumeric image name. Not checked for collisions here; a clash
/// goes through the normal ownership path like any caller-chosen name.
pub fn random_name(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}
