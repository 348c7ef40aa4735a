const RAW_SVG_ONLY: &str = "Return ONLY the raw transformed SVG code. No markdown formatting like ```xml or ```svg. Just the pure raw SVG string starting with <svg> and ending with </svg>.";

pub const SIMPLIFY_ACTION: &str = "simplify";

pub fn animate_prompt(action: &str, svg: &str) -> String {
    format!(
        "You are an expert SVG animator and designer.\n\
         I will give you an SVG file. I want you to transform it by applying the following action/animation: \"{action}\".\n\
         {RAW_SVG_ONLY} Ensure the animation is done using standard SVG <animate>, <animateTransform>, or CSS embedded inside the SVG. \
         Keep the original viewbox and scaling intact but make it visually execute the requested action.\n\n\
         Original SVG:\n{svg}"
    )
}

pub fn simplify_prompt(svg: &str) -> String {
    format!(
        "You are an expert vector artist and SVG optimizer.\n\
         I will provide a highly complex SVG file. I want you to redraw it as a vastly simplified, minimalist vector graphic.\n\
         Reduce the number of paths to an absolute minimum, merge overlapping shapes, simplify complex Bezier curves, and lower coordinate precision.\n\
         Maintain the semantic meaning, silhouette, and primary colors of the image, but heavily optimize it to be less than 5 KB.\n\
         {RAW_SVG_ONLY}\n\n\
         Original SVG:\n{svg}"
    )
}

pub fn vectorize_prompt() -> String {
    "You are an expert vector artist and technical illustrator. Convert the attached image into a crisp, clean, minimalist SVG graphic. \
     Recreate the core subjects of the image using semantic SVG paths, rects, circles, and solid fill colors. \
     Aim for a flat-vector illustration style. Do not use base64 embedded images, only native SVG vectors. \
     Ensure the graphic is production-ready, beautiful, and fully scalable. \
     Output ONLY the raw SVG XML code, starting with <svg> and ending with </svg>, without any markdown formatting or explanations."
        .to_string()
}
