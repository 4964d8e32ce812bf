/// Case-insensitive `1 - edit_distance / longer_len` over characters.
///
/// Two empty titles are identical.
pub fn title_similarity(lhs: &str, rhs: &str) -> f32 {
	let lhs: Vec<char> = lhs.to_lowercase().chars().collect();
	let rhs: Vec<char> = rhs.to_lowercase().chars().collect();
	let (longer, shorter) = if lhs.len() >= rhs.len() { (&lhs, &rhs) } else { (&rhs, &lhs) };

	if longer.is_empty() {
		return 1.0;
	}

	let distance = edit_distance(longer, shorter);

	(longer.len() - distance) as f32 / longer.len() as f32
}

pub fn edit_distance(lhs: &[char], rhs: &[char]) -> usize {
	let mut prev: Vec<usize> = (0..=rhs.len()).collect();
	let mut row = vec![0; rhs.len() + 1];

	for (i, l) in lhs.iter().enumerate() {
		row[0] = i + 1;

		for (j, r) in rhs.iter().enumerate() {
			let substitution = prev[j] + usize::from(l != r);

			row[j + 1] = substitution.min(prev[j + 1] + 1).min(row[j] + 1);
		}

		std::mem::swap(&mut prev, &mut row);
	}

	prev[rhs.len()]
}
