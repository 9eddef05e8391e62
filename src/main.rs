use leptos::prelude::*;
use rescinded_internships::{App, init_logging};

fn main() {
	init_logging();
	mount_to_body(App)
}
