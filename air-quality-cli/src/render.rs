use air_quality_core::{
    AirQualityError, CHART_WINDOW, Locale, Pollutant, PollutantGroup, PollutionReading,
    PollutionSeries, WeatherReading, approximate_from_index, aqi, to_aqi,
};
use chrono::Local;

fn format_time(reading: &PollutionReading, pattern: &str) -> String {
    reading
        .observed_at()
        .map(|t| t.with_timezone(&Local).format(pattern).to_string())
        .unwrap_or_else(|| "unknown time".to_string())
}

/// Summary card for one reading.
///
/// The headline score is the index-based estimate; the PM breakdown below it
/// comes from the concentration tables and may differ.
pub fn pollution_card(
    place_label: &str,
    reading: &PollutionReading,
    pollutant: Option<Pollutant>,
    locale: Locale,
) -> String {
    let headline = approximate_from_index(reading.aqi_index);
    let from_components = to_aqi(&reading.components);

    let mut lines = vec![
        format!("📍 {place_label}"),
        format!("   {}", format_time(reading, "%Y-%m-%d %H:%M")),
        String::new(),
        format!(
            "AQI {:>3}  {} ({})",
            headline.score,
            headline.category,
            headline.category.color_hex()
        ),
        format!("   {}", headline.category.advice(locale)),
        format!(
            "   PM-based AQI: {} ({}); PM2.5 {} / PM10 {}",
            from_components.score,
            from_components.category,
            aqi::pm25_sub_index(reading.components.pm2_5),
            aqi::pm10_sub_index(reading.components.pm10),
        ),
        String::new(),
    ];

    let shown: Vec<Pollutant> = match pollutant {
        Some(p) => vec![p],
        None => Pollutant::all().to_vec(),
    };

    for p in shown {
        lines.push(format!(
            "   {:<6} {:>9.2} {}",
            p.label(),
            p.value(&reading.components),
            p.unit()
        ));
    }

    lines.join("\n")
}

/// Weather section, or a note when the separate weather fetch failed.
pub fn weather_block(
    weather: &Result<WeatherReading, AirQualityError>,
    locale: Locale,
) -> Option<String> {
    match weather {
        Ok(w) => Some(
            [
                "🌡️ Weather".to_string(),
                format!("   Temperature  {:.1} °C", w.temperature_c),
                format!("   Humidity     {:.0} %", w.humidity_pct),
                format!("   Wind         {:.1} m/s", w.wind_speed_ms),
                format!("   Pressure     {:.0} hPa", w.pressure_hpa),
            ]
            .join("\n"),
        ),
        Err(err) => err
            .user_message(locale)
            .map(|msg| format!("🌡️ Weather unavailable: {msg}")),
    }
}

/// Table of the most recent readings, oldest first, restricted to `group`.
pub fn history_table(series: &PollutionSeries, group: PollutantGroup, locale: Locale) -> String {
    let members = group.members();

    let mut header = format!("{:<12}", "time");
    for p in members {
        header.push_str(&format!(" {:>9}", p.label()));
    }

    let mut lines = vec![
        group.insight(locale).to_string(),
        String::new(),
        header,
    ];

    for reading in series.chart_window(CHART_WINDOW) {
        let mut row = format!("{:<12}", format_time(reading, "%d %b %H:%M"));
        for p in members {
            row.push_str(&format!(" {:>9.2}", p.value(&reading.components)));
        }
        lines.push(row);
    }

    lines.push(String::new());
    lines.push(format!(
        "{} readings fetched, showing the latest {}",
        series.len(),
        series.len().min(CHART_WINDOW)
    ));

    lines.join("\n")
}
