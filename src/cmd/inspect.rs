use crate::pkg::internal::date;

pub fn print(ts: Option<i64>, date: Option<&str>) {
    if let Some(d) = date {
        let secs = date::from_calendar_date(d);
        if secs == 0 {
            tracing::warn!("could not parse {} as YYYY-MM-DD", d);
        }
        println!("{d} -> {secs} (s) / {} (ms)", date::seconds_to_millis(secs));
        show(secs);
    }
    if let Some(ts) = ts {
        show(ts);
    }
    if ts.is_none() && date.is_none() {
        tracing::error!("pass --ts or --date");
    }
}

fn show(ts: i64) {
    println!("input:    {}", date::to_input_date(ts));
    println!("display:  {}", date::to_display_date(ts));
    println!("datetime: {}", date::to_display_datetime(ts));
    println!("offset:   {}", date::offset_for_timezone(ts));
}
