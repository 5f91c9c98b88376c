use iced_frame_player::style::{StyleSheet, STYLE_PATH};

fn main() -> iced::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let style = StyleSheet::load(STYLE_PATH);
    iced_frame_player::app::run(style)
}
