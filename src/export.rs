use crate::domain::models::Asset;
use anyhow::Result;
use chrono::NaiveDate;

pub const ASSET_HEADERS: [&str; 4] = ["Asset Number", "Asset Type", "Location", "Status"];

pub fn asset_export_filename(date: NaiveDate) -> String {
    format!("assets-{}.csv", date.format("%Y-%m-%d"))
}

/// One line per asset plus a header, every field quoted.
pub fn assets_csv<'a, I>(assets: I) -> Result<String>
where
    I: IntoIterator<Item = &'a Asset>,
{
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(ASSET_HEADERS)?;
    for asset in assets {
        writer.write_record([
            asset.asset_number.as_str(),
            asset.asset_type_name.as_str(),
            asset.location.as_str(),
            asset.status.as_str(),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|e| anyhow::anyhow!("csv flush failed: {}", e.error()))?;
    Ok(String::from_utf8(bytes)?)
}
