//! Tab separated `x<TAB>y` dump of a terrain, one point per line.

use std::io::{self, Write};

use crate::Terrain;

pub fn write_terrain<W: Write>(terrain: &Terrain, mut out: W) -> io::Result<()> {
    for point in terrain.iter() {
        writeln!(out, "{}\t{}", point.x, point.y)?;
    }
    out.flush()
}

#[cfg(test)]
mod dat_tests {
    use super::*;
    use crate::TerrainPoint;

    #[test]
    fn one_line_per_point() {
        let terrain = Terrain::try_new(
            vec![TerrainPoint::new(0., 1.5), TerrainPoint::new(2., 3.)],
            10.,
        )
        .unwrap();
        let mut out = Vec::new();
        write_terrain(&terrain, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "0\t1.5\n2\t3\n");
    }
}
