//! Built-in data sources.

use super::client::GenericClient;

/// SDO/EVE space-weather diode quicklook files.
pub fn eve() -> GenericClient {
    GenericClient::new(
        "EVE",
        "eve",
        "http://lasp.colorado.edu/eve/data_access/evewebdata/quicklook/L0CS/SpWx/%Y/%Y%m%d_EVE_L0CS_DIODES_1m.txt",
    )
}

/// GOES X-ray sensor daily files.
pub fn xrs() -> GenericClient {
    GenericClient::new(
        "XRS",
        "xrs",
        "https://umbra.nascom.nasa.gov/goes/fits/%Y/go{satellite}%y%m%d.fits",
    )
    .alias("goes")
    .default_satellite(15)
}

/// PROBA2/LYRA standard files.
pub fn lyra() -> GenericClient {
    GenericClient::new(
        "LYRA",
        "lyra",
        "http://proba2.oma.be/lyra/data/bsd/%Y/%m/%d/lyra_%Y%m%d-000000_lev{level}_std.fits",
    )
    .default_level("2")
}

/// Nobeyama Radioheliograph 17 GHz correlation plots.
pub fn norh() -> GenericClient {
    GenericClient::new(
        "NoRH",
        "norh",
        "ftp://solar-pub.nao.ac.jp/pub/nsro/norh/data/tcx/%Y/%m/%d/tca%y%m%d",
    )
}

/// NOAA observed solar-cycle indices. One file covers every date.
pub fn noaa_indices() -> GenericClient {
    GenericClient::new(
        "NOAAIndices",
        "noaa-indices",
        "ftp://ftp.swpc.noaa.gov/pub/weekly/RecentIndices.txt",
    )
}

/// NOAA predicted solar-cycle indices.
pub fn noaa_predict() -> GenericClient {
    GenericClient::new(
        "NOAAPredict",
        "noaa-predict",
        "http://services.swpc.noaa.gov/text/predicted-sunspot-radio-flux.txt",
    )
}

/// NOAA solar region summaries.
pub fn srs() -> GenericClient {
    GenericClient::new(
        "SRS",
        "srs_table",
        "ftp://ftp.swpc.noaa.gov/pub/warehouse/%Y/SRS/%Y%m%dSRS.txt",
    )
}

/// RHESSI daily observing summaries.
pub fn rhessi() -> GenericClient {
    GenericClient::new(
        "RHESSI",
        "rhessi",
        "https://hesperia.gsfc.nasa.gov/hessidata/metadata/catalog/hsi_obssumm_%Y%m%d_v01.fits",
    )
}

pub fn all() -> Vec<GenericClient> {
    vec![
        eve(),
        xrs(),
        lyra(),
        norh(),
        noaa_indices(),
        noaa_predict(),
        srs(),
        rhessi(),
    ]
}
