/// Cosine similarity `dot(a,b) / (|a| * |b|)`; `0.0` when either norm is zero
/// or the dimensions differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Grounding confidence for a generated reply: mean similarity of the
/// retrieved chunks scaled by how much corroborating evidence was found
/// (`min(count / target, 1)`), clamped to `[0, 1]`.
pub fn grounding_confidence(similarities: &[f32], corroboration_target: usize) -> f32 {
    if similarities.is_empty() || corroboration_target == 0 {
        return 0.0;
    }

    let count = similarities.len() as f32;
    let average = similarities.iter().sum::<f32>() / count;
    let evidence = (count / corroboration_target as f32).min(1.0);
    let confidence = average * evidence;

    if confidence.is_nan() {
        0.0
    } else {
        confidence.clamp(0.0, 1.0)
    }
}
