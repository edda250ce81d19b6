//! Embedded listing icons.
//!
//! Icons are inlined into every page as base64 PNG data URIs so listings
//! render without any other object being served alongside them.

use crate::constants::PARENT_LINK_NAME;

const BACK_ICON: &str = concat!(
    "iVBORw0KGgoAAAANSUhEUgAAABQAAAAWCAMAAAD3n0w0AAAAElBMVEX////M//+ZmZlmZmYz",
    "MzMAAACei5rnAAAAAnRSTlP/AOW3MEoAAABWSURBVHjabdBBCgAhDEPRRpv7X3kwEMsQ//IR",
    "RC08urjRHbha5VLFUsVSxVI9lmDh5hMpHD6n0EgoiZG0DNINpnWlcVXaRix76e1/8dddcL6n",
    "G0Ri9gHjtgSXKYeLBgAAAABJRU5ErkJggg==",
);

const COMPRESSED_ICON: &str = concat!(
    "iVBORw0KGgoAAAANSUhEUgAAABQAAAAWCAMAAAD3n0w0AAADAFBMVEX//////8z//5n//2b/",
    "/zP//wD/zP//zMz/zJn/zGb/zDP/zAD/mf//mcz/mZn/mWb/mTP/mQD/Zv//Zsz/Zpn/Zmb/",
    "ZjP/ZgD/M///M8z/M5n/M2b/MzP/MwD/AP//AMz/AJn/AGb/ADP/AADM///M/8zM/5nM/2bM",
    "/zPM/wDMzP/MzMzMzJnMzGbMzDPMzADMmf/MmczMmZnMmWbMmTPMmQDMZv/MZszMZpnMZmbM",
    "ZjPMZgDMM//MM8zMM5nMM2bMMzPMMwDMAP/MAMzMAJnMAGbMADPMAACZ//+Z/8yZ/5mZ/2aZ",
    "/zOZ/wCZzP+ZzMyZzJmZzGaZzDOZzACZmf+ZmcyZmZmZmWaZmTOZmQCZZv+ZZsyZZpmZZmaZ",
    "ZjOZZgCZM/+ZM8yZM5mZM2aZMzOZMwCZAP+ZAMyZAJmZAGaZADOZAABm//9m/8xm/5lm/2Zm",
    "/zNm/wBmzP9mzMxmzJlmzGZmzDNmzABmmf9mmcxmmZlmmWZmmTNmmQBmZv9mZsxmZplmZmZm",
    "ZjNmZgBmM/9mM8xmM5lmM2ZmMzNmMwBmAP9mAMxmAJlmAGZmADNmAAAz//8z/8wz/5kz/2Yz",
    "/zMz/wAzzP8zzMwzzJkzzGYzzDMzzAAzmf8zmcwzmZkzmWYzmTMzmQAzZv8zZswzZpkzZmYz",
    "ZjMzZgAzM/8zM8wzM5kzM2YzMzMzMwAzAP8zAMwzAJkzAGYzADMzAAAA//8A/8wA/5kA/2YA",
    "/zMA/wAAzP8AzMwAzJkAzGYAzDMAzAAAmf8AmcwAmZkAmWYAmTMAmQAAZv8AZswAZpkAZmYA",
    "ZjMAZgAAM/8AM8wAM5kAM2YAMzMAMwAAAP8AAMwAAJkAAGYAADPuAADdAAC7AACqAACIAAB3",
    "AABVAABEAAAiAAARAAAA7gAA3QAAuwAAqgAAiAAAdwAAVQAARAAAIgAAEQAAAO4AAN0AALsA",
    "AKoAAIgAAHcAAFUAAEQAACIAABHu7u7d3d27u7uqqqqIiIh3d3dVVVVEREQiIiIREREAAAD7",
    "CIKZAAAAJXRSTlP///////////////////////////////////////////////8AP89CTwAA",
    "AGtJREFUeNp9z9ENgDAIhOEOco+dybVuEXasFMRDY/x5+xJCO6Znu6kSx7BhXyjtKBWWNlwW",
    "88Loid7hFRKBXiIYCMfMEYUQQohC3CjFA5nIjqx1CqlDLGR/EhM5O06yvin0ftGOyIS7lV14",
    "AsQNaR7rMEBYAAAAAElFTkSuQmCC",
);

const FOLDER_ICON: &str = concat!(
    "iVBORw0KGgoAAAANSUhEUgAAABQAAAAWCAMAAAD3n0w0AAAAElBMVEX/////zJnM//+ZZjMz",
    "MzMAAADCEvqoAAAAA3RSTlP//wDXyg1BAAAASElEQVR42s3KQQ6AQAhDUaXt/a/sQDrRJu7c",
    "+NmQB0e99B3lnqjT6cYx6zSIbV40n3D7psYMoBoz4w8/EdNYQsbGEjNxYSljXTEsA9O1pLTv",
    "AAAAAElFTkSuQmCC",
);

const TEXT_ICON: &str = concat!(
    "iVBORw0KGgoAAAANSUhEUgAAABQAAAAWCAMAAAD3n0w0AAAAD1BMVEX////M//+ZmZkzMzMA",
    "AABVsTOVAAAAAnRSTlP/AOW3MEoAAABISURBVHjatcrRCgAgCENRbf7/N7dKomGvngjhMsPL",
    "D4NdMPwia438NRIyxsaL/XQZhyxpkC6zyjLXGVXnkhqWJWIIrOgeinECLlUCjBCqNQoAAAAA",
    "SUVORK5CYII=",
);

const UNKNOWN_ICON: &str = concat!(
    "iVBORw0KGgoAAAANSUhEUgAAABQAAAAWCAMAAAD3n0w0AAAAD1BMVEX////M//+ZmZkzMzMA",
    "AABVsTOVAAAAAnRSTlP/AOW3MEoAAABYSURBVHjancvRDoAgDEPRruX/v1kmNHPBxMTLyzgD",
    "6FmsILg56g2hQnJkOco4yZhqtN5nYd5Zq0LsHblwxwP9GTCWsaGtoelANKzOlz/RfaLYUmLE",
    "6E28ALlNAupSdoFsAAAAAElFTkSuQmCC",
);

/// Pick the icon for a listing row.
///
/// The parent link always gets the back arrow; everything else is chosen
/// by MIME type.
fn icon_for(filename: &str, mime_type: &str) -> &'static str {
    if filename == PARENT_LINK_NAME {
        return BACK_ICON;
    }
    match mime_type {
        "application/gzip" => COMPRESSED_ICON,
        "application/directory" => FOLDER_ICON,
        "text/html" | "text/plain" => TEXT_ICON,
        _ => UNKNOWN_ICON,
    }
}

/// Data URI of the icon for a listing row.
pub fn get_mime_icon(filename: &str, mime_type: &str) -> String {
    format!("data:image/png;base64,{}", icon_for(filename, mime_type))
}
