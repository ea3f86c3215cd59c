use firnpack_macros::Profile;

#[derive(Profile)]
pub struct BadLayer {
    pub height: f64,
    pub density: f32,
}

fn main() {}
