// src/banner.rs

/// Prints the application startup banner to the console.
pub fn print_banner() {
    // Using a raw string literal for the multi-line banner
    let banner = r#"
 _           _ _     _
| |__   ___ | (_) __| | __ _ _   _
| '_ \ / _ \| | |/ _` |/ _` | | | |
| | | | (_) | | | (_| | (_| | |_| |
|_| |_|\___/|_|_|\__,_|\__,_|\__, |
                             |___/

    Holiday Package Prediction Form
"#;
    println!("{}", banner);
}
