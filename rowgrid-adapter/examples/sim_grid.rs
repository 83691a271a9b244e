use std::collections::BTreeMap;

use rowgrid::{ColumnSpec, ColumnWidth, GridOptions, RowGrid};
use rowgrid_adapter::{GridDriver, ScrollKey, SimSurface};

fn main() {
    let items: Vec<u64> = (0..100_000).collect();
    let mut grid = RowGrid::new(
        items,
        GridOptions::new(24, |item: &u64, index| {
            BTreeMap::from([
                ("name".to_string(), format!("row {index}")),
                ("value".to_string(), item.to_string()),
            ])
        }),
    );
    grid.set_columns(vec![
        ColumnSpec::new("Name", "name", ColumnWidth::Px(200.0)),
        ColumnSpec::new("Value", "value", ColumnWidth::Pct(1.0)),
    ])
    .unwrap();

    let mut driver = GridDriver::new(grid);
    driver.attach(SimSurface::new(240, 640.0));
    driver.pump().unwrap();
    println!("initial markers: {:?}", driver.grid().surface().unwrap().markers());

    // Simulated user scroll.
    driver.grid_mut().surface_mut().unwrap().user_scroll(48_000);
    driver.grid_mut().on_scroll();
    driver.pump().unwrap();
    println!("window after scroll: {:?}", driver.grid().window());

    // Keyboard shortcut.
    driver.on_key(ScrollKey::End);
    driver.pump().unwrap();
    println!("window after End: {:?}", driver.grid().window());

    let surface = driver.detach().unwrap();
    println!("rows after detach: {}", surface.row_count());
}
