use anyhow::{Result, bail, ensure};

/// Join side of a record, the second field of every input line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
	One,
	Two,
}

impl Side {
	pub fn parse(text: &str) -> Result<Side> {
		match text {
			"1" => Ok(Side::One),
			"2" => Ok(Side::Two),
			other => bail!("wrong join side id {other:?}, expected 1 or 2"),
		}
	}

	/// Dense slot used to address per-side storage.
	pub fn slot(self) -> usize {
		match self {
			Side::One => 0,
			Side::Two => 1,
		}
	}
}

/// One tab-separated input line.
///
/// Field 0 is the tile id, field 1 the join side id; everything after that
/// is user attributes including the configured geometry column.
pub struct Record<'a> {
	fields: Vec<&'a str>,
}

impl<'a> Record<'a> {
	pub fn parse(line: &'a str) -> Result<Record<'a>> {
		let fields: Vec<&str> = line.split('\t').collect();
		ensure!(fields.len() >= 2, "record has no join side id: {line:?}");
		Ok(Self { fields })
	}

	pub fn tile_id(&self) -> &'a str {
		self.fields[0]
	}

	pub fn side(&self) -> Result<Side> {
		Side::parse(self.fields[1])
	}

	pub fn field(&self, index: usize) -> Option<&'a str> {
		self.fields.get(index).copied()
	}

	pub fn fields(&self) -> &[&'a str] {
		&self.fields
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn splits_on_tabs() {
		let record = Record::parse("T1\t2\tPOINT(0 0)\tname").unwrap();
		assert_eq!(record.tile_id(), "T1");
		assert_eq!(record.side().unwrap(), Side::Two);
		assert_eq!(record.field(2), Some("POINT(0 0)"));
		assert_eq!(record.field(3), Some("name"));
		assert_eq!(record.field(4), None);
	}

	#[test]
	fn keeps_empty_fields() {
		let record = Record::parse("T1\t1\t\tname").unwrap();
		assert_eq!(record.field(2), Some(""));
	}

	#[test]
	fn rejects_short_lines_and_bad_sides() {
		assert!(Record::parse("lonely").is_err());
		let record = Record::parse("T1\t3\tPOINT(0 0)").unwrap();
		assert!(record.side().is_err());
	}
}
