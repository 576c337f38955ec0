#![allow(dead_code)]

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::{TempDir, tempdir};

pub const UTF8_BOM: &str = "\u{feff}";

pub const EN_DATA: &str = "\
document_id,date,customer,material_name,quantity_delivered,unit_price_pretax,total_price_taxed,warehouse
D001,2024/01/05,Acme Retail,品胜-充电宝 纸盒装,2,10.00,22.60,W1
,,,PISEN PRO 数据线 彩盒,1,5.00,5.65,
D002,2024/3/1,Bright Shop,数据线,4,5.00,22.60,W2
D003,2023/12/31,,耳机 气泡袋,1,30.00,33.90,W1
,合计,,,8,,84.75,
";

pub const EN_MAPPING: &str = "\
material_name,alias
数据线,DL-OLD
充电宝,PB001
数据线,DL01
";

pub const ZH_DATA: &str = "\
日期,客户,物料名称,实发数量,含税单价,价税合计,单据编号,备注
2024/01/05,甲公司,品胜-充电宝 纸盒装,2,10,22.6,X1,
2024/01/07,,充电宝,1,10,11.3,X2,急
 合计 ,,,3,,33.9,,
";

pub const ZH_MAPPING: &str = "\
物料名称,型号简称
充电宝,PB001
";

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }
}

/// Reads a UTF-8 output file, asserting and stripping the byte-order mark.
pub fn read_output(path: &Path) -> String {
    let text = fs::read_to_string(path).expect("read output");
    text.strip_prefix(UTF8_BOM)
        .expect("output starts with a byte-order mark")
        .to_string()
}

pub fn parse_csv(text: &str) -> (Vec<String>, Vec<Vec<String>>) {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(text.as_bytes());
    let headers = reader
        .headers()
        .expect("headers")
        .iter()
        .map(|h| h.to_string())
        .collect();
    let rows = reader
        .records()
        .map(|r| r.expect("record").iter().map(|c| c.to_string()).collect())
        .collect();
    (headers, rows)
}
